use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use common::drive::{DrivePath, FileRecord};

use crate::api::file::{NotifyUploadedRequest, UploadPolicyRequest};
use crate::api::ApiClient;

use super::cancel::CancelSignal;
use super::error::UploadError;
use super::policy::UploadPolicy;
use super::progress::UploadProgress;
use super::transfer::{transfer, TransferContext, UploadFile, UploadedObject};

/// Picks an object key for the file at an index, `None` to use the policy
pub type KeyResolver = Arc<dyn Fn(&UploadFile, usize) -> Option<String> + Send + Sync>;
/// Picks the drive folder an uploaded object is recorded under
pub type PathResolver = Arc<dyn Fn(&UploadedObject, usize) -> DrivePath + Send + Sync>;

/// Per-batch knobs
#[derive(Clone, Default)]
pub struct UploadOptions {
    /// Drive folder every object is recorded under unless a path resolver
    /// says otherwise
    pub destination: DrivePath,
    pub key_resolver: Option<KeyResolver>,
    pub path_resolver: Option<PathResolver>,
    pub cancel: Option<CancelSignal>,
    pub progress: Option<flume::Sender<UploadProgress>>,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("destination", &self.destination)
            .field("key_resolver", &self.key_resolver.is_some())
            .field("path_resolver", &self.path_resolver.is_some())
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl UploadOptions {
    pub fn new(destination: impl Into<DrivePath>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_progress(mut self, progress: flume::Sender<UploadProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_key_resolver(
        mut self,
        resolver: impl Fn(&UploadFile, usize) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.key_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_path_resolver(
        mut self,
        resolver: impl Fn(&UploadedObject, usize) -> DrivePath + Send + Sync + 'static,
    ) -> Self {
        self.path_resolver = Some(Arc::new(resolver));
        self
    }

    fn path_for(&self, object: &UploadedObject, index: usize) -> DrivePath {
        match &self.path_resolver {
            Some(resolve) => DrivePath::new(resolve(object, index)),
            None => self.destination.clone(),
        }
    }
}

/// A file that is both in storage and recorded by the backend
#[derive(Debug, Clone, Serialize)]
pub struct CommittedUpload {
    pub object: UploadedObject,
    /// The record the backend created, when it returned one
    pub record: Option<FileRecord>,
}

/// Final state of one file of a batch
#[derive(Debug)]
pub struct UploadOutcome {
    /// Position of the file in the batch
    pub index: usize,
    pub name: String,
    pub result: Result<CommittedUpload, UploadError>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Two-phase upload: transfer to storage, then notify the backend
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    client: ApiClient,
}

impl UploadPipeline {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Ask the backend for a policy covering `files`
    ///
    /// The request describes the first file; its size is the batch total.
    pub async fn fetch_policy(&self, files: &[UploadFile]) -> Result<UploadPolicy, UploadError> {
        let (file_name, content_type) = files
            .first()
            .map(|f| (f.name.clone(), f.content_type.clone()))
            .unwrap_or_default();
        let request = UploadPolicyRequest {
            file_name,
            file_size: files.iter().map(UploadFile::size).sum(),
            content_type,
        };
        let response = self
            .client
            .call(request)
            .await
            .map_err(UploadError::PolicyRequest)?;
        Ok(UploadPolicy::from_response(&response)?)
    }

    /// Phase one: send every file to storage concurrently
    ///
    /// Results line up with `files`. A failure never stops its siblings.
    pub async fn transfer_batch(
        &self,
        files: &[UploadFile],
        policy: &UploadPolicy,
        options: &UploadOptions,
    ) -> Vec<Result<UploadedObject, UploadError>> {
        let ctx = TransferContext {
            http: self.client.http_client(),
            policy,
            cancel: options.cancel.as_ref(),
            progress: options.progress.clone(),
        };

        let transfers = files.iter().enumerate().map(|(index, file)| {
            let key = options
                .key_resolver
                .as_ref()
                .and_then(|resolve| resolve(file, index));
            let ctx = &ctx;
            async move { transfer(ctx, index, file, key.as_deref()).await }
        });
        join_all(transfers).await
    }

    /// Phase two: create a record for each stored object
    ///
    /// Each object gets its own notify call carrying the policy's upload
    /// session id. A rejected call leaves the object orphaned in storage.
    pub async fn commit(
        &self,
        objects: Vec<(usize, UploadedObject)>,
        policy: &UploadPolicy,
        options: &UploadOptions,
    ) -> Vec<(usize, Result<CommittedUpload, UploadError>)> {
        let notifies = objects.into_iter().map(|(index, object)| {
            let request = NotifyUploadedRequest {
                name: object.name.clone(),
                content_type: object.content_type.clone(),
                size: object.size,
                oss_url: object.storage_url.clone(),
                path: options.path_for(&object, index),
                upload_id: policy.upload_session_id.clone(),
            };
            async move {
                let result = match self.client.call(request).await {
                    Ok(response) => Ok(CommittedUpload {
                        object,
                        record: response.file,
                    }),
                    Err(source) => {
                        tracing::warn!("notify for {} failed: {}", object.name, source);
                        Err(UploadError::NotifyFailed {
                            name: object.name,
                            source,
                        })
                    }
                };
                (index, result)
            }
        });
        join_all(notifies).await
    }

    /// Both phases against an already issued policy
    ///
    /// Notify only runs once every transfer has settled, and only for the
    /// ones that succeeded.
    pub async fn upload_batch(
        &self,
        files: &[UploadFile],
        policy: &UploadPolicy,
        options: &UploadOptions,
    ) -> Vec<UploadOutcome> {
        let transferred = self.transfer_batch(files, policy, options).await;

        let mut outcomes: Vec<Option<Result<CommittedUpload, UploadError>>> =
            Vec::with_capacity(files.len());
        let mut stored = Vec::new();
        for (index, result) in transferred.into_iter().enumerate() {
            match result {
                Ok(object) => {
                    stored.push((index, object));
                    outcomes.push(None);
                }
                Err(err) => outcomes.push(Some(Err(err))),
            }
        }

        tracing::debug!(
            "{} of {} files reached storage",
            stored.len(),
            files.len()
        );
        for (index, result) in self.commit(stored, policy, options).await {
            outcomes[index] = Some(result);
        }
        tracing::info!(
            "{} of {} files uploaded",
            outcomes
                .iter()
                .filter(|o| matches!(o, Some(Ok(_))))
                .count(),
            files.len()
        );

        files
            .iter()
            .zip(outcomes)
            .enumerate()
            .filter_map(|(index, (file, result))| {
                result.map(|result| UploadOutcome {
                    index,
                    name: file.name.clone(),
                    result,
                })
            })
            .collect()
    }

    /// Fetch a policy for the batch, then run both phases
    ///
    /// Fails as a whole only when no usable policy could be obtained.
    pub async fn upload_and_notify(
        &self,
        files: &[UploadFile],
        options: &UploadOptions,
    ) -> Result<Vec<UploadOutcome>, UploadError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let policy = self.fetch_policy(files).await?;
        Ok(self.upload_batch(files, &policy, options).await)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn object(name: &str) -> UploadedObject {
        UploadedObject {
            name: name.to_string(),
            content_type: "text/plain".to_string(),
            size: 1,
            storage_url: format!("https://oss.example.com/{}", name),
            object_key: name.to_string(),
        }
    }

    #[test]
    fn test_destination_is_normalized() {
        let options = UploadOptions::new("docs");
        assert_eq!(options.path_for(&object("a"), 0).as_str(), "/docs/");
    }

    #[test]
    fn test_path_resolver_overrides_destination() {
        let options = UploadOptions::new("/docs/").with_path_resolver(|object, index| {
            DrivePath::new(format!("by-index/{}/{}", index, object.name))
        });
        assert_eq!(
            options.path_for(&object("a"), 3).as_str(),
            "/by-index/3/a/"
        );
    }

    #[test]
    fn test_options_debug_hides_closures() {
        let options = UploadOptions::new("/").with_key_resolver(|_, _| None);
        let debug = format!("{:?}", options);
        assert!(debug.contains("key_resolver: true"));
        assert!(debug.contains("path_resolver: false"));
    }
}
