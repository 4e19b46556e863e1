use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A persisted bearer token and the instant it stops being usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    /// Epoch seconds; never later than the token's own `exp`
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Named, expiring persistence for credentials
///
/// Plays the role a cookie jar plays in a browser: a flat map of names to
/// values, each carrying its own expiry.
pub trait CredentialStorage: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Credential>, StorageError>;
    fn set(&self, name: &str, credential: Credential) -> Result<(), StorageError>;
    fn remove(&self, name: &str) -> Result<(), StorageError>;
}

/// Process-local storage, forgotten on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Credential>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, name: &str) -> Result<Option<Credential>, StorageError> {
        Ok(self.entries.lock().get(name).cloned())
    }

    fn set(&self, name: &str, credential: Credential) -> Result<(), StorageError> {
        self.entries.lock().insert(name.to_string(), credential);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(name);
        Ok(())
    }
}

/// Credentials kept in a JSON file so a session survives between runs
///
/// The whole file is rewritten on every change; a missing file reads as
/// empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // serializes read-modify-write cycles from this process
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Credential>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, Credential>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let mut file = owner_only()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(contents.as_bytes())?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn owner_only() -> fs::OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = fs::OpenOptions::new();
    options.mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only() -> fs::OpenOptions {
    fs::OpenOptions::new()
}

// `mode` only applies on create; older files get tightened too
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl CredentialStorage for FileStorage {
    fn get(&self, name: &str) -> Result<Option<Credential>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(name))
    }

    fn set(&self, name: &str, credential: Credential) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        entries.insert(name.to_string(), credential);
        self.save(&entries)
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        if entries.remove(name).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
