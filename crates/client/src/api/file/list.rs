use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::{DrivePath, FileRecord};

use crate::api::{ApiError, ApiRequest};

/// List the records directly inside a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFilesRequest {
    pub path: DrivePath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFilesResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for ListFilesRequest {
    type Response = ListFilesResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("file/list/")?;
        Ok(client.post(full_url).json(&self))
    }
}
