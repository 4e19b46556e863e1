//! Session credentials
//!
//! The backend issues a pair of signed bearer tokens on login: a short-lived
//! *access* token sent with every authorized call, and a longer-lived
//! *refresh* token traded for a new pair. This module keeps that pair:
//!
//! - **[`TokenClaims`]**: decodes the claims segment and its `exp`
//! - **[`CredentialStorage`]**: named, expiring persistence (memory or file)
//! - **[`CredentialStore`]**: the per-slot state machine on top
//!
//! # Slot lifecycle
//!
//! ```text
//!          store(valid)              read() after exp
//!  Empty ---------------> Valid ---------------------> Expired
//!    ^                      |                             |
//!    |      clear()         |   (evicted by that read)    |
//!    +----------------------+-----------------------------+
//! ```
//!
//! Storing an undecodable or already expired token behaves like `clear()`.

mod clock;
mod storage;
mod store;
mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{Credential, CredentialStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{
    CredentialStore, SessionTokens, Slot, SlotState, ACCESS_TOKEN_NAME, REFRESH_TOKEN_NAME,
};
pub use token::{TokenClaims, TokenError};
