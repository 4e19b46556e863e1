use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical folder path inside the drive
///
/// Always starts with `/`; anything but the root also ends with `/`
/// (`/`, `/docs/`, `/docs/2024/`). This is the form the backend groups
/// records by, so every path headed for the backend goes through here.
/// Normalizing an already normalized path changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DrivePath(String);

impl DrivePath {
    pub fn root() -> Self {
        DrivePath("/".to_string())
    }

    /// Normalize any user or backend supplied path
    ///
    /// An empty string means the root.
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        if path.is_empty() || path == "/" {
            return Self::root();
        }

        let mut normalized = String::with_capacity(path.len() + 2);
        if !path.starts_with('/') {
            normalized.push('/');
        }
        normalized.push_str(path);
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        DrivePath(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The folder `name` directly under this one
    pub fn join(&self, name: &str) -> Self {
        let name = name.trim_matches('/');
        if name.is_empty() {
            return self.clone();
        }
        DrivePath(format!("{}{}/", self.0, name))
    }

    /// Non-empty path segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The containing folder; the root is its own parent
    pub fn parent(&self) -> Self {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) => DrivePath::new(&trimmed[..=idx]),
            None => Self::root(),
        }
    }
}

impl Default for DrivePath {
    fn default() -> Self {
        Self::root()
    }
}

impl From<String> for DrivePath {
    fn from(path: String) -> Self {
        DrivePath::new(path)
    }
}

impl From<&str> for DrivePath {
    fn from(path: &str) -> Self {
        DrivePath::new(path)
    }
}

impl From<DrivePath> for String {
    fn from(path: DrivePath) -> Self {
        path.0
    }
}

impl AsRef<str> for DrivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
