use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::{DrivePath, FileRecord};

use crate::api::{ApiError, ApiRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder the new one is created in
    pub path: DrivePath,
    pub folder_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderResponse {
    pub folder: FileRecord,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for CreateFolderRequest {
    type Response = CreateFolderResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("file/new-folder/")?;
        Ok(client.post(full_url).json(&self))
    }
}
