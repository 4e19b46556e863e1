use std::str::FromStr;
use std::sync::Arc;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use url::Url;

use common::auth::{CredentialStore, FileStorage, SystemClock};

pub const APP_NAME: &str = "drive";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Default log level; `RUST_LOG` still takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn api_url(&self) -> Result<Url, StateError> {
        Url::parse(&self.api_url).map_err(|_| StateError::InvalidApiUrl(self.api_url.clone()))
    }

    /// Unparseable levels fall back to the default
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::INFO)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the drive directory (~/.drive)
    pub drive_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the persisted session tokens
    pub credentials_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the drive directory path (custom or default ~/.drive)
    pub fn drive_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new drive state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let drive_dir = Self::drive_dir(custom_path)?;

        if drive_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        let config = config.unwrap_or_default();
        // refuse to write a config that could never be loaded
        config.api_url()?;

        fs::create_dir_all(&drive_dir)?;
        let config_path = drive_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            credentials_path: drive_dir.join(CREDENTIALS_FILE_NAME),
            drive_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the drive directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let drive_dir = Self::drive_dir(custom_path)?;
        let config_path = drive_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            credentials_path: drive_dir.join(CREDENTIALS_FILE_NAME),
            drive_dir,
            config_path,
            config,
        })
    }

    /// Session tokens persisted next to the config
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(
            Arc::new(FileStorage::new(&self.credentials_path)),
            Arc::new(SystemClock),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("drive directory not initialized. Run 'drive init' first")]
    NotInitialized,

    #[error("drive directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid api url: {0:?}")]
    InvalidApiUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
