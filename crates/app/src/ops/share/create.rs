use clap::Args;

use client::api::drop::{CreateDropRequest, ExpireDays};
use client::api::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Ids of the records to share
    #[arg(long = "file", required = true, num_args = 1..)]
    pub files: Vec<i64>,

    /// Code others open the share with
    #[arg(long)]
    pub code: String,

    /// Days until the link expires: 1, 3, 7 or 15
    #[arg(long)]
    pub expire_days: Option<ExpireDays>,

    /// Only logged in users may open the share
    #[arg(long)]
    pub require_login: bool,

    /// Stop serving downloads after this many
    #[arg(long)]
    pub max_downloads: Option<u64>,

    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut request = CreateDropRequest::new(self.files.clone(), &self.code);
        if let Some(password) = &self.password {
            request = request.with_password(password);
        }
        request.expire_days = self.expire_days;
        request.require_login = self.require_login.then_some(true);
        request.max_download_count = self.max_downloads;

        let response = ctx.client.call(request).await?;
        let mut lines = vec![format!(
            "Shared {} file(s) as {} (id {}, expires in {} days)",
            response.files.len(),
            response.drop.code,
            response.drop.id,
            response.drop.expire_days
        )];
        if let Some(url) = response.share_url {
            lines.push(url);
        }
        Ok(lines.join("\n"))
    }
}
