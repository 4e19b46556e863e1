use clap::Args;

use client::api::file::DownloadFileRequest;
use client::api::ApiError;
use client::share::{download_shared, ShareAccessError};

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Id of the record to download
    #[arg(long)]
    pub id: i64,

    /// Download through this share instead of your own drive
    #[arg(long)]
    pub code: Option<String>,

    /// Password of the share
    #[arg(long, requires = "code")]
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Share(#[from] ShareAccessError),
}

#[async_trait::async_trait]
impl crate::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let link = match &self.code {
            Some(code) => {
                download_shared(&ctx.client, self.id, code, self.password.as_deref()).await?
            }
            None => ctx.client.call(DownloadFileRequest::own(self.id)).await?,
        };
        Ok(link.url)
    }
}
