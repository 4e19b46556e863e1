use bytes::Bytes;
use futures::Stream;

/// Bytes handed to the transport per progress step
pub const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// Percent-complete report for one file of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    /// Position of the file in the batch
    pub index: usize,
    pub name: String,
    pub percent: u8,
    pub sent: u64,
    pub total: u64,
}

/// Reports progress for one file onto the batch channel
///
/// Only emits when the rounded percentage changes. Nothing is emitted for
/// an empty payload until [`ProgressReporter::finish`], since there is no
/// meaningful total to divide by.
#[derive(Debug, Clone)]
pub(crate) struct ProgressReporter {
    tx: Option<flume::Sender<UploadProgress>>,
    index: usize,
    name: String,
    total: u64,
    sent: u64,
    last: Option<u8>,
}

impl ProgressReporter {
    pub(crate) fn new(
        tx: Option<flume::Sender<UploadProgress>>,
        index: usize,
        name: &str,
        total: u64,
    ) -> Self {
        Self {
            tx,
            index,
            name: name.to_string(),
            total,
            sent: 0,
            last: None,
        }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.sent = (self.sent + bytes).min(self.total);
        if self.total == 0 {
            return;
        }
        let percent = ((self.sent as f64 / self.total as f64) * 100.0).round() as u8;
        self.emit(percent);
    }

    /// Storage accepted the object
    pub(crate) fn finish(&mut self) {
        self.sent = self.total;
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        if let Some(tx) = &self.tx {
            // a dropped receiver just means nobody is watching
            let _ = tx.send(UploadProgress {
                index: self.index,
                name: self.name.clone(),
                percent,
                sent: self.sent,
                total: self.total,
            });
        }
    }
}

/// Stream a payload in fixed-size chunks, reporting each one as it is
/// pulled by the transport
pub(crate) fn progress_stream(
    data: Bytes,
    mut reporter: ProgressReporter,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let mut offset = 0;
    let chunks = std::iter::from_fn(move || {
        if offset >= data.len() {
            return None;
        }
        let end = (offset + PROGRESS_CHUNK_SIZE).min(data.len());
        let chunk = data.slice(offset..end);
        offset = end;
        Some(chunk)
    });

    futures::stream::iter(chunks.map(move |chunk| {
        reporter.advance(chunk.len() as u64);
        Ok(chunk)
    }))
}
