//! Content fingerprints for the drive client
//!
//! The backend keys uploads and integrity checks by the MD5 digest of the
//! raw bytes, so the digest here has to match any standards-compliant MD5
//! bit for bit:
//!
//! - **One-shot**: [`digest`] / [`hex_digest`] for in-memory buffers and strings
//! - **Incremental**: [`Md5`] for hashing large files chunk by chunk
//!
//! Every call owns its own state; nothing is shared between hashers.

mod md5;

pub use md5::{digest, hex_digest, Digest, Md5, DIGEST_SIZE};
