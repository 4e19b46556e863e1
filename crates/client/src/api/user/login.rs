use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest, Auth};

use super::profile::UserInfo;

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;

    const AUTH: Auth = Auth::None;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("user/login/")?;
        Ok(client.post(full_url).json(&self))
    }
}
