use clap::Args;

use client::api::drop::DeleteDropRequest;
use client::api::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Id of the share to delete
    #[arg(long)]
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(DeleteDropRequest { id: self.id }).await?;
        Ok(format!("Deleted share {}", self.id))
    }
}
