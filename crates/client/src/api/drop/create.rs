use std::str::FromStr;

use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::drive::FileRecord;

use super::DropRecord;
use crate::api::{ApiError, ApiRequest};

/// Lifetimes the backend accepts for a share link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExpireDays {
    One,
    Three,
    Seven,
    Fifteen,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("share links expire after 1, 3, 7 or 15 days, not {0:?}")]
pub struct InvalidExpireDays(pub String);

impl TryFrom<u8> for ExpireDays {
    type Error = InvalidExpireDays;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        match days {
            1 => Ok(ExpireDays::One),
            3 => Ok(ExpireDays::Three),
            7 => Ok(ExpireDays::Seven),
            15 => Ok(ExpireDays::Fifteen),
            other => Err(InvalidExpireDays(other.to_string())),
        }
    }
}

impl From<ExpireDays> for u8 {
    fn from(days: ExpireDays) -> Self {
        match days {
            ExpireDays::One => 1,
            ExpireDays::Three => 3,
            ExpireDays::Seven => 7,
            ExpireDays::Fifteen => 15,
        }
    }
}

impl FromStr for ExpireDays {
    type Err = InvalidExpireDays;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| InvalidExpireDays(s.to_string()))
            .and_then(ExpireDays::try_from)
    }
}

/// Share a set of file records under `code`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDropRequest {
    pub files: Vec<i64>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_days: Option<ExpireDays>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_download_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl CreateDropRequest {
    pub fn new(files: Vec<i64>, code: impl Into<String>) -> Self {
        Self {
            files,
            code: code.into().trim().to_string(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into().trim().to_string();
        self.password = (!password.is_empty()).then_some(password);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDropResponse {
    pub drop: DropRecord,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
}

impl ApiRequest for CreateDropRequest {
    type Response = CreateDropResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("drop/create/")?;
        Ok(client.post(full_url).json(&self))
    }
}
