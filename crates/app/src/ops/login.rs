use clap::Args;

use client::api::ApiError;

use crate::state::StateError;

#[derive(Args, Clone)]
pub struct Login {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Login {
    type Error = LoginError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        // an in-memory session would be gone when we exit
        ctx.state()?;

        let response = ctx.client.login(&self.username, &self.password).await?;
        let name = response
            .user
            .map(|user| user.username)
            .unwrap_or_else(|| self.username.clone());

        Ok(format!("Logged in as {}", name))
    }
}
