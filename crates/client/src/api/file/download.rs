use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiRequest, Auth};

/// Ask for a download link to a record, optionally through a share
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadFileRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl DownloadFileRequest {
    /// Download one of the caller's own records
    pub fn own(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Download a record exposed by the share `code`
    ///
    /// Code and password are trimmed; blank values are left out.
    pub fn shared(id: i64, code: Option<&str>, password: Option<&str>) -> Self {
        Self {
            id,
            code: non_blank(code),
            password: non_blank(password),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadFileResponse {
    #[serde(alias = "download_url")]
    pub url: String,
    #[serde(default)]
    pub expired_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for DownloadFileRequest {
    type Response = DownloadFileResponse;

    const AUTH: Auth = Auth::Optional;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("file/{}/download/", self.id))?;
        Ok(client.post(full_url).json(&self))
    }
}
