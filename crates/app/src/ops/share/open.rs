use clap::Args;

use client::share::{open_share, ShareAccessError};

use crate::ops::ls::human_size;

#[derive(Args, Debug, Clone)]
pub struct Open {
    /// Share code
    pub code: String,

    #[arg(long)]
    pub password: Option<String>,
}

#[async_trait::async_trait]
impl crate::op::Op for Open {
    type Error = ShareAccessError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let share = open_share(&ctx.client, &self.code, self.password.as_deref()).await?;

        let mut lines = vec![format!("{}: {} file(s)", share.drop.code, share.files.len())];
        lines.extend(share.files.iter().map(|file| {
            format!(
                "{}\t{}{} ({})",
                file.id,
                file.path,
                file.name,
                human_size(file.size)
            )
        }));
        Ok(lines.join("\n"))
    }
}
