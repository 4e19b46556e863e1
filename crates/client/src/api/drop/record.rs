use serde::{Deserialize, Serialize};

/// A share link as the backend returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRecord {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub expire_days: u32,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub require_login: bool,
    #[serde(default)]
    pub download_count: u64,
    /// Zero means unlimited
    #[serde(default)]
    pub max_download_count: u64,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: String,
}

impl DropRecord {
    pub fn is_available(&self) -> bool {
        !self.is_expired && !self.is_deleted
    }

    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Downloads left before the link stops working, `None` when unlimited
    pub fn downloads_left(&self) -> Option<u64> {
        (self.max_download_count > 0)
            .then(|| self.max_download_count.saturating_sub(self.download_count))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sparse_record_and_limits() {
        let record: DropRecord =
            serde_json::from_str(r#"{"id": 3, "code": "abc", "password": ""}"#).unwrap();
        assert!(record.is_available());
        assert!(!record.has_password());
        assert_eq!(record.downloads_left(), None);

        let limited = DropRecord {
            max_download_count: 2,
            download_count: 3,
            password: Some("pw".to_string()),
            ..record
        };
        assert_eq!(limited.downloads_left(), Some(0));
        assert!(limited.has_password());
    }
}
