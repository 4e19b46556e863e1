use clap::Args;

use client::api::user::ProfileRequest;
use client::api::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Logout;

#[async_trait::async_trait]
impl crate::op::Op for Logout {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        match ctx.client.logout().await {
            Ok(()) => Ok("Logged out".to_string()),
            Err(err) => {
                tracing::warn!("backend did not revoke the session: {}", err);
                Ok("Logged out locally".to_string())
            }
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct Whoami;

#[derive(Debug, thiserror::Error)]
pub enum WhoamiError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Whoami {
    type Error = WhoamiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let profile = ctx.client.call(ProfileRequest).await?;
        let user = profile.user();

        let mut lines = vec![format!("{} (id {})", user.username, user.id)];
        if !user.display_name.is_empty() {
            lines.push(format!("name: {}", user.display_name));
        }
        if !user.email.is_empty() {
            lines.push(format!("email: {}", user.email));
        }
        if let Some(remaining) = ctx.client.credentials().access_remaining() {
            lines.push(format!("session expires in {}", format_remaining(remaining)));
        }
        Ok(lines.join("\n"))
    }
}

#[derive(Args, Debug, Clone)]
pub struct Refresh;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Refresh {
    type Error = RefreshError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.refresh().await?;
        let remaining = ctx
            .client
            .credentials()
            .access_remaining()
            .map(format_remaining)
            .unwrap_or_else(|| "unknown".to_string());
        Ok(format!("Session refreshed, expires in {}", remaining))
    }
}

fn format_remaining(seconds: u64) -> String {
    match seconds {
        s if s >= 3600 => format!("{}h{:02}m", s / 3600, (s % 3600) / 60),
        s if s >= 60 => format!("{}m{:02}s", s / 60, s % 60),
        s => format!("{}s", s),
    }
}
