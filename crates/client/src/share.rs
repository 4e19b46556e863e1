use serde_json::Value;

use crate::api::drop::{DropDetailResponse, GetDropRequest};
use crate::api::file::{DownloadFileRequest, DownloadFileResponse};
use crate::api::{ApiClient, ApiError};

/// Shown when the backend gave nothing better to go on
pub const GENERIC_SHARE_FAILURE: &str = "failed to load shared content";

const PASSWORD_KEYWORDS: &[&str] = &["password", "secret", "credential", "密码"];
const STRICT_PASSWORD_KEYWORDS: &[&str] = &["password", "secret", "密码"];
const LIMIT_KEYWORDS: &[&str] = &["download", "次数", "limit", "quota", "exceed"];
const NOT_FOUND_KEYWORDS: &[&str] = &["not found", "不存在"];
const LOGIN_KEYWORDS: &[&str] = &["login", "登录", "unauthorized", "forbidden"];

/// Why a share link could not be opened
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareAccessError {
    #[error("you need to log in to view this share")]
    Unauthorized,
    #[error("this share does not exist or has been removed")]
    NotFound,
    #[error("the share password is incorrect")]
    InvalidPassword,
    #[error("this share has reached its download limit")]
    LimitExceeded,
    #[error("{0}")]
    Other(String),
}

impl ShareAccessError {
    /// Map a status and backend message onto a share failure
    ///
    /// The status decides first; the message is only searched for
    /// keywords once the status alone is not conclusive.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        let raw = message.trim();
        let normalized = raw.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| normalized.contains(k));

        match status {
            Some(401) => return ShareAccessError::Unauthorized,
            Some(404) => return ShareAccessError::NotFound,
            Some(403) => {
                return if mentions(PASSWORD_KEYWORDS) {
                    ShareAccessError::InvalidPassword
                } else if mentions(LIMIT_KEYWORDS) {
                    ShareAccessError::LimitExceeded
                } else {
                    ShareAccessError::Unauthorized
                };
            }
            Some(400) if mentions(STRICT_PASSWORD_KEYWORDS) => {
                return ShareAccessError::InvalidPassword
            }
            _ => {}
        }

        if mentions(NOT_FOUND_KEYWORDS) {
            ShareAccessError::NotFound
        } else if mentions(LIMIT_KEYWORDS) {
            ShareAccessError::LimitExceeded
        } else if mentions(PASSWORD_KEYWORDS) {
            ShareAccessError::InvalidPassword
        } else if mentions(LOGIN_KEYWORDS) {
            ShareAccessError::Unauthorized
        } else if raw.is_empty() {
            ShareAccessError::Other(GENERIC_SHARE_FAILURE.to_string())
        } else {
            ShareAccessError::Other(raw.to_string())
        }
    }
}

impl From<&ApiError> for ShareAccessError {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::HttpStatus(status, body) => {
                Self::classify(Some(status.as_u16()), &body_message(body))
            }
            ApiError::Backend { message, .. } => Self::classify(None, message),
            ApiError::Unauthenticated | ApiError::InvalidSession => ShareAccessError::Unauthorized,
            other => Self::classify(other.status().map(|s| s.as_u16()), &other.to_string()),
        }
    }
}

/// Open the share `code`, reporting failures as share errors
pub async fn open_share(
    client: &ApiClient,
    code: &str,
    password: Option<&str>,
) -> Result<DropDetailResponse, ShareAccessError> {
    client
        .call(GetDropRequest::new(code, password))
        .await
        .map_err(|err| share_failure(code, err))
}

/// Get a download link for record `id` through the share `code`
pub async fn download_shared(
    client: &ApiClient,
    id: i64,
    code: &str,
    password: Option<&str>,
) -> Result<DownloadFileResponse, ShareAccessError> {
    client
        .call(DownloadFileRequest::shared(id, Some(code), password))
        .await
        .map_err(|err| share_failure(code, err))
}

fn share_failure(code: &str, err: ApiError) -> ShareAccessError {
    tracing::debug!("share {} failed: {}", code.trim(), err);
    ShareAccessError::from(&err)
}

/// `message`, then `detail`, then the body itself
fn body_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "detail"].iter().find_map(|field| {
            json.get(*field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });
    from_json.unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_decides_first() {
        assert_eq!(
            ShareAccessError::classify(Some(401), "wrong password"),
            ShareAccessError::Unauthorized
        );
        assert_eq!(
            ShareAccessError::classify(Some(404), "quota exceeded"),
            ShareAccessError::NotFound
        );
    }

    #[test]
    fn test_forbidden_is_refined_by_message() {
        assert_eq!(
            ShareAccessError::classify(Some(403), "Invalid share credential"),
            ShareAccessError::InvalidPassword
        );
        assert_eq!(
            ShareAccessError::classify(Some(403), "下载次数已用完"),
            ShareAccessError::LimitExceeded
        );
        assert_eq!(
            ShareAccessError::classify(Some(403), "nope"),
            ShareAccessError::Unauthorized
        );
    }

    #[test]
    fn test_bad_request_only_matches_strict_password_keywords() {
        assert_eq!(
            ShareAccessError::classify(Some(400), "密码错误"),
            ShareAccessError::InvalidPassword
        );
        // "credential" is not a password hint on a 400, but the
        // keyword fallback still catches it
        assert_eq!(
            ShareAccessError::classify(Some(400), "bad credential"),
            ShareAccessError::InvalidPassword
        );
        assert_eq!(
            ShareAccessError::classify(Some(400), "Download limit reached"),
            ShareAccessError::LimitExceeded
        );
    }

    #[test]
    fn test_keyword_fallback_order() {
        assert_eq!(
            ShareAccessError::classify(None, "Share NOT FOUND, password irrelevant"),
            ShareAccessError::NotFound
        );
        assert_eq!(
            ShareAccessError::classify(Some(500), "please login first"),
            ShareAccessError::Unauthorized
        );
        assert_eq!(
            ShareAccessError::classify(None, "  server exploded  "),
            ShareAccessError::Other("server exploded".to_string())
        );
        assert_eq!(
            ShareAccessError::classify(None, "   "),
            ShareAccessError::Other(GENERIC_SHARE_FAILURE.to_string())
        );
    }

    #[test]
    fn test_from_api_error_reads_body_fields() {
        let err = ApiError::HttpStatus(
            StatusCode::FORBIDDEN,
            r#"{"detail": "download quota exceeded"}"#.to_string(),
        );
        assert_eq!(ShareAccessError::from(&err), ShareAccessError::LimitExceeded);

        let err = ApiError::HttpStatus(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(
            ShareAccessError::from(&err),
            ShareAccessError::Other("upstream down".to_string())
        );

        let err = ApiError::Backend {
            code: 1,
            message: "分享不存在".to_string(),
        };
        assert_eq!(ShareAccessError::from(&err), ShareAccessError::NotFound);
    }
}
