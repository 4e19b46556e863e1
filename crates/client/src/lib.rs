/**
 * Typed requests against the drive backend.
 *  - `ApiClient` owns the HTTP client and the session credentials
 *  - one module per endpoint group, each request carrying its response type
 */
pub mod api;
/**
 * Opening share links and downloading through them,
 *  with backend failures mapped to something a user can act on.
 */
pub mod share;
/**
 * Direct-to-object-storage uploads.
 * Presigned policy form upload with progress and cancellation,
 *  followed by the notify call that creates the file record.
 */
pub mod upload;

pub mod prelude {
    pub use crate::api::{ApiClient, ApiError, ApiRequest};
    pub use crate::share::ShareAccessError;
    pub use crate::upload::{
        CancelSignal, UploadError, UploadFile, UploadOptions, UploadOutcome, UploadPipeline,
        UploadPolicy, UploadProgress, UploadedObject,
    };
}
