use crate::api::ApiError;

use super::policy::PolicyError;

/// Why a single file did not make it into the drive
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Rejected locally before any network traffic
    #[error("{name} is too large: {}MB > {}MB", megabytes(.size), megabytes(.limit))]
    SizeExceeded { name: String, size: u64, limit: u64 },

    /// Storage answered with a non-2xx status, or the transport failed
    #[error("upload of {name} failed: {reason}")]
    TransferFailed {
        name: String,
        status: Option<u16>,
        reason: String,
    },

    /// The cancellation signal fired before or during the transfer
    #[error("upload of {name} was cancelled")]
    TransferAborted { name: String },

    /// Bytes reached storage but the backend did not create the record
    #[error("{name} reached storage but the backend rejected it: {source}")]
    NotifyFailed {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("malformed upload policy: {0}")]
    MalformedPolicy(#[from] PolicyError),

    #[error("could not obtain an upload policy: {0}")]
    PolicyRequest(#[source] ApiError),
}

impl UploadError {
    /// Cancellation is not a failure worth showing to the user
    pub fn is_aborted(&self) -> bool {
        matches!(self, UploadError::TransferAborted { .. })
    }

    /// Whether the object may have been left orphaned in storage
    pub fn is_orphaned(&self) -> bool {
        matches!(self, UploadError::NotifyFailed { .. })
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            UploadError::SizeExceeded { name, .. }
            | UploadError::TransferFailed { name, .. }
            | UploadError::TransferAborted { name }
            | UploadError::NotifyFailed { name, .. } => Some(name),
            UploadError::MalformedPolicy(_) | UploadError::PolicyRequest(_) => None,
        }
    }
}

fn megabytes(bytes: &u64) -> String {
    format!("{:.2}", *bytes as f64 / (1024.0 * 1024.0))
}
