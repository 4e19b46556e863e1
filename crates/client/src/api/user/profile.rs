use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub permission: String,
}

/// The profile either bare or wrapped as `{ user, message }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileResponse {
    Wrapped {
        user: UserInfo,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(UserInfo),
}

impl ProfileResponse {
    pub fn user(&self) -> &UserInfo {
        match self {
            ProfileResponse::Wrapped { user, .. } => user,
            ProfileResponse::Bare(user) => user,
        }
    }
}

impl ApiRequest for ProfileRequest {
    type Response = ProfileResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("user/profile/")?;
        Ok(client.get(full_url))
    }
}
