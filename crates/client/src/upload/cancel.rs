use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation shared by every transfer of a batch
///
/// Firing it makes transfers that have not started yet resolve as aborted
/// without touching the network, and drops the in-flight requests of the
/// ones that have. Clones observe the same signal.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal has fired
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            // the sender lives as long as `self`, so this only fails on drop
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
