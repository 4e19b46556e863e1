use serde::{Deserialize, Serialize};

/// Content type the backend uses to mark a folder record
pub const FOLDER_CONTENT_TYPE: &str = "folder";

/// A file or folder entry as the backend reports it
///
/// `path` is the folder the entry lives in, not the entry itself; a folder
/// named `b` inside `/a/` has `path: "/a/"` and `name: "b"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub oss_url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub path: String,
}

impl FileRecord {
    pub fn is_folder(&self) -> bool {
        self.content_type == FOLDER_CONTENT_TYPE
    }
}
