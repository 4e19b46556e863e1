use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, ApiRequest};

/// Ask the backend for a presigned upload policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPolicyRequest {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
}

/// Raw policy as issued
///
/// The token's field names vary between backend revisions, so it is kept
/// as JSON here and normalized by
/// [`UploadPolicy::from_response`](crate::upload::UploadPolicy::from_response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub token: Value,
    #[serde(default)]
    pub upload_id: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for UploadPolicyRequest {
    type Response = PolicyResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("file/get-token/")?;
        Ok(client.post(full_url).json(&self))
    }
}
