use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::{DrivePath, FileRecord};

use crate::api::{ApiError, ApiRequest};

/// Tell the backend an object landed in storage so it creates the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyUploadedRequest {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub oss_url: String,
    pub path: DrivePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCreateResponse {
    #[serde(default)]
    pub file: Option<FileRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for NotifyUploadedRequest {
    type Response = FileCreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("file/uploaded/")?;
        Ok(client.post(full_url).json(&self))
    }
}
