use clap::Args;

use client::api::drop::{DropRecord, ListDropsRequest};
use client::api::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let drops = ctx.client.call(ListDropsRequest).await?.into_drops();
        if drops.is_empty() {
            return Ok("No shares".to_string());
        }
        Ok(drops
            .iter()
            .map(describe_drop)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn describe_drop(drop: &DropRecord) -> String {
    let mut parts = vec![drop.id.to_string(), drop.code.clone()];
    if !drop.is_available() {
        parts.push("expired".to_string());
    }
    if drop.has_password() {
        parts.push("password".to_string());
    }
    if drop.require_login {
        parts.push("login".to_string());
    }
    parts.push(match drop.downloads_left() {
        Some(left) => format!("{} downloads left", left),
        None => format!("{} downloads", drop.download_count),
    });
    parts.join("\t")
}
