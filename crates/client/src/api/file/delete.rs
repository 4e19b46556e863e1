use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for DeleteFileRequest {
    type Response = DeleteFileResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("file/{}/delete/", self.id))?;
        Ok(client.post(full_url).json(&serde_json::json!({})))
    }
}
