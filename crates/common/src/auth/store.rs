use std::sync::Arc;

use parking_lot::Mutex;

use super::clock::{Clock, SystemClock};
use super::storage::{Credential, CredentialStorage, MemoryStorage};
use super::token::{TokenClaims, TokenError};

/// Storage name of the access token
pub const ACCESS_TOKEN_NAME: &str = "access_token";
/// Storage name of the refresh token
pub const REFRESH_TOKEN_NAME: &str = "refresh_token";

/// One of the two credential holders of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Access,
    Refresh,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Access, Slot::Refresh];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::Access => ACCESS_TOKEN_NAME,
            Slot::Refresh => REFRESH_TOKEN_NAME,
        }
    }
}

/// What a lazy check found in a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Valid(String),
    /// Present in storage but unusable; evicted by the read that saw it
    Expired,
}

/// The tokens that survived a read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// The process-wide access / refresh pair
///
/// Validity is checked lazily on every read rather than by a timer: a
/// read that finds an expired or undecodable token deletes it and reports
/// the slot as empty. Bad input never produces an error here; it always
/// degrades to "not logged in", which callers already handle.
///
/// Clones share storage, clock and lock.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn CredentialStorage>,
    clock: Arc<dyn Clock>,
    // a read and the eviction it triggers form one critical section
    lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn CredentialStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// A store that lives only as long as the process, on the wall clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock))
    }

    /// Validate and persist a fresh pair, replacing whatever was there
    ///
    /// All or nothing: if either token fails to decode or is already
    /// expired, both slots are cleared. Returns whether the pair was kept.
    pub fn store(&self, access_token: &str, refresh_token: &str) -> bool {
        let _guard = self.lock.lock();
        let now = self.clock.now();

        let access = match validate(access_token, now) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!("rejecting access token: {}", e);
                self.clear_locked();
                return false;
            }
        };
        let refresh = match validate(refresh_token, now) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!("rejecting refresh token: {}", e);
                self.clear_locked();
                return false;
            }
        };

        for (slot, credential) in [(Slot::Access, access), (Slot::Refresh, refresh)] {
            if let Err(e) = self.storage.set(slot.name(), credential) {
                tracing::warn!("failed to persist {}: {}", slot.name(), e);
                self.clear_locked();
                return false;
            }
        }

        tracing::debug!("stored session credentials");
        true
    }

    /// Current usable tokens, evicting any that have expired
    pub fn read(&self) -> SessionTokens {
        let _guard = self.lock.lock();
        let now = self.clock.now();

        let token = |slot| match self.check_locked(slot, now) {
            SlotState::Valid(token) => Some(token),
            SlotState::Empty | SlotState::Expired => None,
        };

        SessionTokens {
            access: token(Slot::Access),
            refresh: token(Slot::Refresh),
        }
    }

    /// Lazily check a single slot
    pub fn slot_state(&self, slot: Slot) -> SlotState {
        let _guard = self.lock.lock();
        let now = self.clock.now();
        self.check_locked(slot, now)
    }

    /// Drop both slots unconditionally
    pub fn clear(&self) {
        let _guard = self.lock.lock();
        self.clear_locked();
    }

    /// `Bearer <access>` when an access token is usable
    pub fn authorization_header_value(&self) -> Option<String> {
        self.read()
            .access
            .map(|token| format!("Bearer {}", token))
    }

    /// Seconds until the access token expires, if there is one
    pub fn access_remaining(&self) -> Option<u64> {
        let access = self.read().access?;
        let now = self.clock.now();
        TokenClaims::decode(&access).ok().map(|c| c.remaining(now))
    }

    fn check_locked(&self, slot: Slot, now: i64) -> SlotState {
        let stored = match self.storage.get(slot.name()) {
            Ok(Some(stored)) => stored,
            Ok(None) => return SlotState::Empty,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", slot.name(), e);
                return SlotState::Empty;
            }
        };

        let usable = stored.expires_at > now
            && TokenClaims::decode(&stored.token)
                .map(|claims| !claims.is_expired(now))
                .unwrap_or(false);
        if usable {
            return SlotState::Valid(stored.token);
        }

        tracing::debug!("evicting expired {}", slot.name());
        if let Err(e) = self.storage.remove(slot.name()) {
            tracing::warn!("failed to evict {}: {}", slot.name(), e);
        }
        SlotState::Expired
    }

    fn clear_locked(&self) {
        for slot in Slot::ALL {
            if let Err(e) = self.storage.remove(slot.name()) {
                tracing::warn!("failed to remove {}: {}", slot.name(), e);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum InvalidCredential {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("token already expired")]
    Expired,
}

fn validate(token: &str, now: i64) -> Result<Credential, InvalidCredential> {
    let claims = TokenClaims::decode(token)?;
    if claims.remaining(now) == 0 {
        return Err(InvalidCredential::Expired);
    }
    Ok(Credential {
        token: token.to_string(),
        expires_at: claims.expires_at(),
    })
}
