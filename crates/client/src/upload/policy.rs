use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use url::Url;

use crate::api::file::PolicyResponse;

/// Default status the storage host is asked to answer with
pub const DEFAULT_SUCCESS_STATUS: &str = "200";

/// Everything outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped in key segments
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("policy token is not an object")]
    NotAnObject,
    #[error("missing {0} in upload policy")]
    MissingField(&'static str),
    #[error("invalid upload host {0:?}")]
    InvalidHost(String),
}

/// A presigned, write-once upload capability
///
/// Fetched per batch and never cached: the backend enforces its expiry and
/// a stale policy is never retried. Built from whatever field spelling the
/// backend used by [`UploadPolicy::parse`], so nothing downstream has to
/// care about variants.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub access_key_id: String,
    pub policy: String,
    pub signature: String,
    /// Where the form is posted
    pub host: Url,
    /// Host exactly as the backend sent it, trailing slash trimmed
    pub public_base: String,
    pub key_prefix: String,
    /// Object key fixed by the backend, overriding `key_prefix`
    pub key: Option<String>,
    /// `None` disables the local size check
    pub max_object_size: Option<u64>,
    pub success_action_status: String,
    pub security_token: Option<String>,
    pub upload_session_id: Option<String>,
}

impl UploadPolicy {
    pub fn from_response(response: &PolicyResponse) -> Result<Self, PolicyError> {
        let upload_session_id = response.upload_id.as_ref().and_then(stringish);
        Self::parse(&response.token, upload_session_id)
    }

    /// Normalize a raw policy token
    pub fn parse(token: &Value, upload_session_id: Option<String>) -> Result<Self, PolicyError> {
        let token = token.as_object().ok_or(PolicyError::NotAnObject)?;

        let access_key_id = first_string(token, &["access_key_id", "accessid"])
            .ok_or(PolicyError::MissingField("access key id"))?;
        let policy =
            first_string(token, &["policy"]).ok_or(PolicyError::MissingField("policy"))?;
        let signature =
            first_string(token, &["signature"]).ok_or(PolicyError::MissingField("signature"))?;
        let raw_host = first_string(token, &["host"]).ok_or(PolicyError::MissingField("host"))?;
        let host = Url::parse(&raw_host).map_err(|_| PolicyError::InvalidHost(raw_host.clone()))?;

        Ok(Self {
            access_key_id,
            policy,
            signature,
            host,
            public_base: raw_host.trim_end_matches('/').to_string(),
            key_prefix: first_string(token, &["prefix", "dir"]).unwrap_or_default(),
            key: first_string(token, &["key"]),
            max_object_size: token.get("max_file_size").and_then(size_limit),
            success_action_status: first_string(token, &["success_action_status"])
                .unwrap_or_else(|| DEFAULT_SUCCESS_STATUS.to_string()),
            security_token: first_string(token, &["x-oss-security-token", "security_token"]),
            upload_session_id,
        })
    }

    /// Destination key for a file: override, then policy key, then prefix + name
    pub fn object_key(&self, file_name: &str, key_override: Option<&str>) -> String {
        if let Some(key) = key_override.filter(|k| !k.is_empty()) {
            return key.to_string();
        }
        if let Some(key) = &self.key {
            return key.clone();
        }
        format!("{}{}", normalize_prefix(&self.key_prefix), file_name)
    }

    /// Public URL of an object stored under `key`
    pub fn storage_url(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, URI_COMPONENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.public_base, encoded)
    }
}

/// Object key a file would be stored under, without uploading it
pub fn preview_object_key(file_name: &str, policy: &UploadPolicy) -> String {
    policy.object_key(file_name, None)
}

/// Storage URL for a key, without uploading anything
pub fn preview_storage_url(key: &str, policy: &UploadPolicy) -> String {
    policy.storage_url(key)
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

fn first_string(token: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| token.get(*name))
        .find_map(stringish)
}

// strings and numbers both show up for ids and statuses
fn stringish(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn size_limit(value: &Value) -> Option<u64> {
    let limit = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if limit.is_finite() && limit > 0.0 {
        Some(limit.floor() as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn token() -> Value {
        json!({
            "access_key_id": "AKID",
            "policy": "cG9saWN5",
            "signature": "c2ln",
            "host": "https://bucket.oss.example.com/",
            "prefix": "uploads/42",
            "max_file_size": 1024,
            "expiration": "2030-01-01T00:00:00Z",
        })
    }

    #[test]
    fn test_parse_canonical_fields() {
        let policy = UploadPolicy::parse(&token(), Some("up-1".to_string())).unwrap();
        assert_eq!(policy.access_key_id, "AKID");
        assert_eq!(policy.key_prefix, "uploads/42");
        assert_eq!(policy.max_object_size, Some(1024));
        assert_eq!(policy.success_action_status, "200");
        assert_eq!(policy.security_token, None);
        assert_eq!(policy.upload_session_id.as_deref(), Some("up-1"));
    }

    #[test]
    fn test_parse_field_variants() {
        let mut raw = token();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("access_key_id");
        obj.insert("accessid".into(), json!("LEGACY"));
        obj.insert("max_file_size".into(), json!("2048"));
        obj.insert("security_token".into(), json!("sts"));
        obj.insert("success_action_status".into(), json!(201));

        let policy = UploadPolicy::parse(&raw, None).unwrap();
        assert_eq!(policy.access_key_id, "LEGACY");
        assert_eq!(policy.max_object_size, Some(2048));
        assert_eq!(policy.security_token.as_deref(), Some("sts"));
        assert_eq!(policy.success_action_status, "201");

        obj_insert(&mut raw, "x-oss-security-token", json!("preferred"));
        let policy = UploadPolicy::parse(&raw, None).unwrap();
        assert_eq!(policy.security_token.as_deref(), Some("preferred"));
    }

    fn obj_insert(raw: &mut Value, key: &str, value: Value) {
        raw.as_object_mut().unwrap().insert(key.to_string(), value);
    }

    #[test]
    fn test_missing_access_key_is_malformed() {
        let mut raw = token();
        raw.as_object_mut().unwrap().remove("access_key_id");
        assert_eq!(
            UploadPolicy::parse(&raw, None),
            Err(PolicyError::MissingField("access key id"))
        );
        assert_eq!(
            UploadPolicy::parse(&json!("nope"), None),
            Err(PolicyError::NotAnObject)
        );
    }

    #[test]
    fn test_unusable_size_limits_disable_the_check() {
        for limit in [json!(0), json!(-5), json!("abc"), json!(null)] {
            let mut raw = token();
            obj_insert(&mut raw, "max_file_size", limit);
            assert_eq!(UploadPolicy::parse(&raw, None).unwrap().max_object_size, None);
        }
    }

    #[test]
    fn test_object_key_resolution() {
        let mut policy = UploadPolicy::parse(&token(), None).unwrap();
        assert_eq!(policy.object_key("a.txt", None), "uploads/42/a.txt");
        assert_eq!(policy.object_key("a.txt", Some("custom/k")), "custom/k");

        policy.key = Some("fixed/key".to_string());
        assert_eq!(policy.object_key("a.txt", None), "fixed/key");
        assert_eq!(policy.object_key("a.txt", Some("custom/k")), "custom/k");

        policy.key = None;
        policy.key_prefix = String::new();
        assert_eq!(preview_object_key("a.txt", &policy), "a.txt");
    }

    #[test]
    fn test_storage_url_encodes_segments() {
        let policy = UploadPolicy::parse(&token(), None).unwrap();
        assert_eq!(
            preview_storage_url("uploads/42/my file (1).txt", &policy),
            "https://bucket.oss.example.com/uploads/42/my%20file%20(1).txt"
        );
        assert_eq!(
            policy.storage_url("报告.pdf"),
            "https://bucket.oss.example.com/%E6%8A%A5%E5%91%8A.pdf"
        );
        assert_eq!(
            policy.storage_url("a/it's~*!.txt"),
            "https://bucket.oss.example.com/a/it's~*!.txt"
        );
        assert_eq!(
            policy.storage_url("q/a+b&c=d#e.txt"),
            "https://bucket.oss.example.com/q/a%2Bb%26c%3Dd%23e.txt"
        );
    }

    #[test]
    fn test_storage_url_keeps_host_as_sent() {
        let mut raw = token();
        obj_insert(&mut raw, "host", json!("https://Bucket.Example.com:443/"));
        let policy = UploadPolicy::parse(&raw, None).unwrap();
        assert_eq!(
            policy.storage_url("k/a b.txt"),
            "https://Bucket.Example.com:443/k/a%20b.txt"
        );
        assert_eq!(policy.host.as_str(), "https://bucket.example.com/");
    }
}
