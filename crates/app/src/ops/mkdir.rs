use clap::Args;

use client::api::file::CreateFolderRequest;
use client::api::ApiError;
use common::drive::DrivePath;

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Folder to create the new one in
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Name of the new folder
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("folder name must not be empty or contain '/'")]
    InvalidName,
}

#[async_trait::async_trait]
impl crate::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let name = self.name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(MkdirError::InvalidName);
        }

        let path = DrivePath::new(&self.path);
        let response = ctx
            .client
            .call(CreateFolderRequest {
                path: path.clone(),
                folder_name: name.to_string(),
            })
            .await?;

        Ok(format!(
            "Created {} (id {})",
            path.join(&response.folder.name),
            response.folder.id
        ))
    }
}
