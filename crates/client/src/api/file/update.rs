use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::{DrivePath, FileRecord};

use crate::api::{ApiError, ApiRequest};

/// Rename or move a record; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<DrivePath>,
}

impl UpdateFileRequest {
    /// Move record `id` into the folder at `path`
    pub fn move_to(id: i64, path: impl Into<DrivePath>) -> Self {
        Self {
            id,
            name: None,
            path: Some(path.into()),
        }
    }

    pub fn rename(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFileResponse {
    pub file: FileRecord,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for UpdateFileRequest {
    type Response = UpdateFileResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("file/{}/update/", self.id))?;
        Ok(client.post(full_url).json(&self))
    }
}
