//! Post-upload size enforcement.
//!
//! The policy's `content-length-range` is enforced by S3 for simple uploads,
//! but multipart uploads are only checked part by part. The verifier reads the
//! final object's metadata once the client reports completion and deletes any
//! object larger than the configured maximum.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SigningConfig;
use crate::error::StorageError;
use crate::storage::{ObjectHead, ObjectStore};

/// Outcome of verifying a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadVerificationResult {
    /// Whether the object was kept.
    pub accepted: bool,
    /// Object size in bytes.
    pub size: u64,
    /// The object's content type.
    pub content_type: String,
    /// The object's ETag.
    pub etag: String,
}

impl UploadVerificationResult {
    fn from_head(head: ObjectHead, accepted: bool) -> Self {
        Self {
            accepted,
            size: head.size,
            content_type: head.content_type,
            etag: head.etag,
        }
    }
}

/// Checks completed uploads against the configured maximum size.
#[derive(Clone)]
pub struct UploadVerifier {
    bucket: String,
    max_size: Option<u64>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for UploadVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadVerifier")
            .field("bucket", &self.bucket)
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

impl UploadVerifier {
    /// Create a verifier for the configured bucket.
    #[must_use]
    pub fn new(config: &SigningConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: config.bucket.clone(),
            max_size: config.max_size,
            store,
        }
    }

    /// Verify an object the caller expects to exist.
    ///
    /// An object over the maximum size is deleted exactly once and reported
    /// with `accepted: false`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist, and
    /// [`StorageError::Backend`] if the metadata fetch or delete fails.
    pub async fn verify(&self, key: &str) -> Result<UploadVerificationResult, StorageError> {
        let head = self.store.head(&self.bucket, key).await?;

        match self.max_size {
            Some(max) if head.size > max => {
                warn!(
                    bucket = %self.bucket,
                    key,
                    size = head.size,
                    max_size = max,
                    "upload exceeds maximum size, deleting"
                );
                self.store.delete(&self.bucket, key).await?;
                Ok(UploadVerificationResult::from_head(head, false))
            }
            _ => {
                info!(bucket = %self.bucket, key, size = head.size, "upload accepted");
                Ok(UploadVerificationResult::from_head(head, true))
            }
        }
    }

    /// Verify an object that may not have landed yet.
    ///
    /// Returns `Ok(None)` if the object does not exist, for callers polling
    /// for completion.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the metadata fetch or delete fails.
    pub async fn try_verify(
        &self,
        key: &str,
    ) -> Result<Option<UploadVerificationResult>, StorageError> {
        match self.verify(key).await {
            Ok(result) => Ok(Some(result)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
