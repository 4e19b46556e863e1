use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::FileRecord;

use super::DropRecord;
use crate::api::{ApiError, ApiRequest, Auth};

/// Open a share link by its code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDropRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl GetDropRequest {
    /// Blank passwords are left out of the request
    pub fn new(code: &str, password: Option<&str>) -> Self {
        Self {
            code: code.trim().to_string(),
            password: password
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropDetailResponse {
    pub drop: DropRecord,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for GetDropRequest {
    type Response = DropDetailResponse;

    // shares can be opened without an account unless they require one
    const AUTH: Auth = Auth::Optional;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("drop/get-drop/")?;
        Ok(client.post(full_url).json(&self))
    }
}
