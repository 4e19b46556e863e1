use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};

use super::cancel::CancelSignal;
use super::error::UploadError;
use super::policy::UploadPolicy;
use super::progress::{progress_stream, ProgressReporter, UploadProgress};

/// Fallback when a file's type cannot be determined
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file queued for upload, held in memory
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadFile {
    /// Content type is guessed from the name's extension
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            name,
            content_type,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };
        self
    }

    /// Read a local file; the drive name is the file name
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Fingerprint of the payload, as the backend computes it
    pub fn digest(&self) -> String {
        common::crypto::hex_digest(&self.data)
    }
}

/// An object that storage has accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub storage_url: String,
    pub object_key: String,
}

/// Everything one transfer needs besides the file itself
pub(crate) struct TransferContext<'a> {
    pub http: &'a Client,
    pub policy: &'a UploadPolicy,
    pub cancel: Option<&'a CancelSignal>,
    pub progress: Option<flume::Sender<UploadProgress>>,
}

/// Refuse files over the policy limit without any network traffic
pub(crate) fn ensure_within_size(
    file: &UploadFile,
    policy: &UploadPolicy,
) -> Result<(), UploadError> {
    match policy.max_object_size {
        Some(limit) if file.size() > limit => Err(UploadError::SizeExceeded {
            name: file.name.clone(),
            size: file.size(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// The presigned POST form; the payload has to be the last field
pub(crate) fn build_form(
    policy: &UploadPolicy,
    key: &str,
    file: &UploadFile,
    reporter: ProgressReporter,
) -> Result<Form, reqwest::Error> {
    let mut form = Form::new()
        .text("key", key.to_string())
        .text("OSSAccessKeyId", policy.access_key_id.clone())
        .text("policy", policy.policy.clone())
        .text("signature", policy.signature.clone())
        .text("success_action_status", policy.success_action_status.clone());
    if let Some(token) = &policy.security_token {
        form = form.text("x-oss-security-token", token.clone());
    }

    let content_type = match file.content_type.parse::<mime_guess::Mime>() {
        Ok(mime) => mime.to_string(),
        Err(_) => DEFAULT_CONTENT_TYPE.to_string(),
    };
    let body = Body::wrap_stream(progress_stream(file.data.clone(), reporter));
    let part = Part::stream_with_length(body, file.size())
        .file_name(file.name.clone())
        .mime_str(&content_type)?;

    Ok(form.part("file", part))
}

/// Send one file to the storage host
///
/// Checks size first, then the cancellation signal, and only then opens a
/// connection. Cancelling mid-flight drops the request.
pub(crate) async fn transfer(
    ctx: &TransferContext<'_>,
    index: usize,
    file: &UploadFile,
    key_override: Option<&str>,
) -> Result<UploadedObject, UploadError> {
    ensure_within_size(file, ctx.policy)?;

    let key = ctx.policy.object_key(&file.name, key_override);
    let aborted = || UploadError::TransferAborted {
        name: file.name.clone(),
    };
    let failed = |status: Option<u16>, reason: String| UploadError::TransferFailed {
        name: file.name.clone(),
        status,
        reason,
    };

    if ctx.cancel.is_some_and(CancelSignal::is_cancelled) {
        tracing::debug!("skipping {}: batch already cancelled", file.name);
        return Err(aborted());
    }

    let reporter = ProgressReporter::new(ctx.progress.clone(), index, &file.name, file.size());
    let form = build_form(ctx.policy, &key, file, reporter.clone())
        .map_err(|e| failed(None, e.to_string()))?;

    tracing::debug!("uploading {} ({} bytes) as {}", file.name, file.size(), key);
    let send = ctx.http.post(ctx.policy.host.clone()).multipart(form).send();

    let response = match ctx.cancel {
        Some(cancel) => tokio::select! {
            response = send => response,
            _ = cancel.cancelled() => {
                tracing::debug!("cancelled in-flight upload of {}", file.name);
                return Err(aborted());
            }
        },
        None => send.await,
    }
    .map_err(|e| failed(e.status().map(|s| s.as_u16()), e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("storage rejected {}: {}", file.name, status);
        return Err(failed(
            Some(status.as_u16()),
            format!("storage upload failed: {}", status.as_u16()),
        ));
    }

    if file.size() == 0 {
        let mut reporter = reporter;
        reporter.finish();
    }

    Ok(UploadedObject {
        name: file.name.clone(),
        content_type: file.content_type.clone(),
        size: file.size(),
        storage_url: ctx.policy.storage_url(&key),
        object_key: key,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn policy(limit: Option<u64>) -> UploadPolicy {
        let mut token = serde_json::json!({
            "access_key_id": "AKID",
            "policy": "p",
            "signature": "s",
            "host": "http://127.0.0.1:9/",
        });
        if let Some(limit) = limit {
            token["max_file_size"] = serde_json::json!(limit);
        }
        UploadPolicy::parse(&token, None).unwrap()
    }

    #[test]
    fn test_size_check_boundary() {
        let file = UploadFile::new("f.bin", vec![0u8; 10]);
        assert!(ensure_within_size(&file, &policy(Some(10))).is_ok());
        assert!(ensure_within_size(&file, &policy(None)).is_ok());
        match ensure_within_size(&file, &policy(Some(9))) {
            Err(UploadError::SizeExceeded { name, size, limit }) => {
                assert_eq!(name, "f.bin");
                assert_eq!(size, 10);
                assert_eq!(limit, 9);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_upload_file_content_type() {
        assert_eq!(UploadFile::new("a.txt", "x").content_type, "text/plain");
        assert_eq!(
            UploadFile::new("blob", "x").content_type,
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(
            UploadFile::new("a.txt", "x")
                .with_content_type("")
                .content_type,
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(
            UploadFile::new("abc", "abc").digest(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[tokio::test]
    async fn test_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, b"# notes").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "notes.md");
        assert_eq!(file.size(), 7);
        assert_eq!(file.content_type, "text/markdown");
    }
}
