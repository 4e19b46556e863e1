use std::path::PathBuf;

use clap::Args;

use client::upload::{
    CancelSignal, UploadError, UploadFile, UploadOptions, UploadOutcome, UploadPipeline,
    UploadProgress,
};
use common::drive::DrivePath;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Drive folder to upload into
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Local files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadOpError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("{report}\n{failed} of {total} uploads failed")]
    Incomplete {
        report: String,
        failed: usize,
        total: usize,
    },
}

#[async_trait::async_trait]
impl crate::op::Op for Upload {
    type Error = UploadOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut files = Vec::with_capacity(self.files.len());
        for path in &self.files {
            let file = UploadFile::from_path(path)
                .await
                .map_err(|source| UploadOpError::Read {
                    path: path.clone(),
                    source,
                })?;
            files.push(file);
        }

        let cancel = CancelSignal::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, cancelling uploads");
                    cancel.cancel();
                }
            }
        });

        let (progress_tx, progress_rx) = flume::unbounded::<UploadProgress>();
        let reporter = tokio::spawn(async move {
            while let Ok(progress) = progress_rx.recv_async().await {
                tracing::info!(
                    "{}: {}% ({}/{} bytes)",
                    progress.name,
                    progress.percent,
                    progress.sent,
                    progress.total
                );
            }
        });

        let options = UploadOptions::new(DrivePath::new(&self.path))
            .with_cancel(cancel)
            .with_progress(progress_tx);
        let pipeline = UploadPipeline::new(ctx.client.clone());
        let result = pipeline.upload_and_notify(&files, &options).await;

        interrupt.abort();
        // closing the channel lets the reporter drain and exit
        drop(options);
        let _ = reporter.await;

        let outcomes = result?;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let report = outcomes
            .iter()
            .map(describe_outcome)
            .collect::<Vec<_>>()
            .join("\n");

        if failed == 0 {
            Ok(report)
        } else {
            Err(UploadOpError::Incomplete {
                report,
                failed,
                total: outcomes.len(),
            })
        }
    }
}

fn describe_outcome(outcome: &UploadOutcome) -> String {
    match &outcome.result {
        Ok(committed) => match &committed.record {
            Some(record) => format!(
                "uploaded {} -> {}{} (id {})",
                outcome.name, record.path, record.name, record.id
            ),
            None => format!("uploaded {} -> {}", outcome.name, committed.object.storage_url),
        },
        Err(err) if err.is_aborted() => format!("cancelled {}", outcome.name),
        Err(err) if err.is_orphaned() => format!(
            "failed {}: {} (the object may remain in storage)",
            outcome.name, err
        ),
        Err(err) => format!("failed {}: {}", outcome.name, err),
    }
}
