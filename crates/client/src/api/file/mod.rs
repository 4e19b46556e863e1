mod delete;
mod download;
mod list;
mod new_folder;
mod policy;
mod update;
mod uploaded;

pub use delete::{DeleteFileRequest, DeleteFileResponse};
pub use download::{DownloadFileRequest, DownloadFileResponse};
pub use list::{ListFilesRequest, ListFilesResponse};
pub use new_folder::{CreateFolderRequest, CreateFolderResponse};
pub use policy::{PolicyResponse, UploadPolicyRequest};
pub use update::{UpdateFileRequest, UpdateFileResponse};
pub use uploaded::{FileCreateResponse, NotifyUploadedRequest};
