use std::error::Error;
use std::path::PathBuf;

use url::Url;

use client::api::{ApiClient, ApiError};
use common::auth::CredentialStore;

use crate::state::{AppState, StateError, DEFAULT_API_URL};

/// Resolve the remote URL for the API client.
///
/// Priority: explicit `--remote` flag > config file `api_url` > hardcoded default.
pub fn resolve_remote(explicit: Option<Url>, state: Option<&AppState>) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    if let Some(url) = state.and_then(|s| s.config.api_url().ok()) {
        return url;
    }
    default_remote()
}

fn default_remote() -> Url {
    Url::parse(DEFAULT_API_URL).expect("hardcoded URL must parse")
}

#[derive(Clone)]
pub struct OpContext {
    /// API client (always initialized with default or custom URL)
    pub client: ApiClient,
    /// Optional custom config path (defaults to ~/.drive)
    pub config_path: Option<PathBuf>,
    /// Loaded state, when the drive directory has been initialized
    pub state: Option<AppState>,
}

impl OpContext {
    /// Sessions persist only once the drive directory exists
    pub fn new(
        remote: Url,
        config_path: Option<PathBuf>,
        state: Option<AppState>,
    ) -> Result<Self, ApiError> {
        let credentials = state
            .as_ref()
            .map(AppState::credential_store)
            .unwrap_or_else(CredentialStore::in_memory);

        Ok(Self {
            client: ApiClient::new(&remote, credentials)?,
            config_path,
            state,
        })
    }

    pub fn state(&self) -> Result<&AppState, StateError> {
        self.state.as_ref().ok_or(StateError::NotInitialized)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
