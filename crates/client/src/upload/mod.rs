//! Direct-to-object-storage uploads
//!
//! A batch runs in two phases against one presigned [`UploadPolicy`]:
//!
//! 1. every file is POSTed to the storage host as a policy form, all at
//!    once, each reporting [`UploadProgress`] and honouring a shared
//!    [`CancelSignal`]
//! 2. each object that landed is announced to the backend, which creates
//!    the file record
//!
//! Outcomes are reported per file. Nothing is retried: a policy is only
//! good for the batch it was issued for.

mod cancel;
mod error;
mod pipeline;
mod policy;
mod progress;
mod transfer;

pub use cancel::CancelSignal;
pub use error::UploadError;
pub use pipeline::{
    CommittedUpload, KeyResolver, PathResolver, UploadOptions, UploadOutcome, UploadPipeline,
};
pub use policy::{
    preview_object_key, preview_storage_url, PolicyError, UploadPolicy, DEFAULT_SUCCESS_STATUS,
};
pub use progress::{UploadProgress, PROGRESS_CHUNK_SIZE};
pub use transfer::{UploadFile, UploadedObject, DEFAULT_CONTENT_TYPE};
