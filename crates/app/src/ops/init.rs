use clap::Args;

use crate::state::{AppConfig, AppState, DEFAULT_API_URL, DEFAULT_LOG_LEVEL};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Backend API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Default log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_url: self.api_url.clone(),
            log_level: self.log_level.clone(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized drive directory at: {}\n\
             - Config: {}\n\
             - Credentials: {}\n\
             - API URL: {}\n\
             - Log level: {}",
            state.drive_dir.display(),
            state.config_path.display(),
            state.credentials_path.display(),
            state.config.api_url,
            state.config.log_level,
        ))
    }
}
