use clap::Args;

use client::api::file::UpdateFileRequest;
use client::api::ApiError;
use common::drive::DrivePath;

#[derive(Args, Debug, Clone)]
pub struct Mv {
    /// Id of the file or folder to move
    #[arg(long)]
    pub id: i64,

    /// Destination folder
    #[arg(long)]
    pub to: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MvError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Mv {
    type Error = MvError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let destination = DrivePath::new(&self.to);
        let response = ctx
            .client
            .call(UpdateFileRequest::move_to(self.id, destination))
            .await?;

        Ok(format!("Moved {} to {}", response.file.name, response.file.path))
    }
}
