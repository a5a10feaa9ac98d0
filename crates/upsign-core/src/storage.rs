//! Object store collaborator.
//!
//! The verifier only needs two operations from the bucket: read an object's
//! metadata and delete an object. [`ObjectStore`] abstracts them so the
//! server can plug in the AWS SDK while tests use [`InMemoryObjectStore`].

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::StorageError;

// ---------------------------------------------------------------------------
// ObjectHead
// ---------------------------------------------------------------------------

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// Object size in bytes.
    pub size: u64,
    /// The object's `Content-Type`, empty if the store reported none.
    pub content_type: String,
    /// The object's ETag, as reported by the store (usually quoted).
    pub etag: String,
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

/// Metadata and delete access to a bucket.
///
/// Implementations own their own timeouts and retries; failures are
/// propagated to the caller unchanged.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's metadata.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist and
    /// [`StorageError::Backend`] for any other failure.
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError>;

    /// Delete an object. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the store rejects the delete.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// InMemoryObjectStore
// ---------------------------------------------------------------------------

/// A thread-safe in-memory [`ObjectStore`] keyed by `(bucket, key)`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), ObjectHead>,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object's metadata, replacing any previous entry.
    pub fn put(&self, bucket: &str, key: &str, head: ObjectHead) {
        self.objects
            .insert((bucket.to_owned(), key.to_owned()), head);
    }

    /// Whether an object exists.
    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_owned(), key.to_owned()))
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError> {
        self.objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_owned(),
            })
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let removed = self
            .objects
            .remove(&(bucket.to_owned(), key.to_owned()))
            .is_some();
        debug!(bucket, key, removed, "deleted object");
        Ok(())
    }
}
