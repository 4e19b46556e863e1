use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest, Auth};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access: String,
    /// Only present when the backend rotates refresh tokens
    #[serde(default)]
    pub refresh: Option<String>,
}

impl ApiRequest for RefreshTokenRequest {
    type Response = RefreshTokenResponse;

    // the access token may already be gone by the time we refresh
    const AUTH: Auth = Auth::Optional;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("user/refresh-token/")?;
        Ok(client.post(full_url).json(&self))
    }
}
