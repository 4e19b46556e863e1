/**
 * Content digests.
 *  - MD5 implemented from raw bytes, used for
 *    backend-compatible content fingerprints
 */
pub mod crypto;
/**
 * Session credentials.
 * Decodes signed bearer tokens, derives their expiry
 *  and keeps the access / refresh pair in an
 *  injected, expiring storage.
 */
pub mod auth;
/**
 * Logical drive layout.
 * Normalized drive paths, the file records the backend
 *  hands out for them, and the tree materialized
 *  from a flat record list.
 */
pub mod drive;

pub mod prelude {
    pub use crate::auth::{
        Clock, CredentialStorage, CredentialStore, FileStorage, MemoryStorage, SessionTokens,
        SystemClock,
    };
    pub use crate::crypto::{digest, hex_digest, Digest, Md5};
    pub use crate::drive::{build_tree, collect_keys, DrivePath, FileRecord, NodeKind, TreeNode};
}
