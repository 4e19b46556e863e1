use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("backend error {code}: {message}")]
    Backend { code: i64, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not logged in")]
    Unauthenticated,
    #[error("backend issued unusable session tokens")]
    InvalidSession,
}

impl ApiError {
    /// HTTP status of the failed response, when there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::HttpStatus(status, _) => Some(*status),
            ApiError::Reqwest(e) => e.status(),
            _ => None,
        }
    }
}
