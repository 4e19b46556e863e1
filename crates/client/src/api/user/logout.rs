use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest, Auth};

/// Revoke a refresh token on the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for LogoutRequest {
    type Response = LogoutResponse;

    // an expired access token must not keep the refresh token alive
    const AUTH: Auth = Auth::Optional;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("user/logout/")?;
        Ok(client.post(full_url).json(&self))
    }
}
