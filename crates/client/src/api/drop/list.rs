use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::DropRecord;
use crate::api::{ApiError, ApiRequest};

/// The caller's own share links
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDropsRequest;

/// Either a bare array or `{ drops, message }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListDropsResponse {
    Bare(Vec<DropRecord>),
    Wrapped {
        drops: Vec<DropRecord>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ListDropsResponse {
    pub fn drops(&self) -> &[DropRecord] {
        match self {
            ListDropsResponse::Bare(drops) => drops,
            ListDropsResponse::Wrapped { drops, .. } => drops,
        }
    }

    pub fn into_drops(self) -> Vec<DropRecord> {
        match self {
            ListDropsResponse::Bare(drops) => drops,
            ListDropsResponse::Wrapped { drops, .. } => drops,
        }
    }
}

impl ApiRequest for ListDropsRequest {
    type Response = ListDropsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("drop/")?;
        Ok(client.get(full_url))
    }
}
