//! AWS-backed collaborators for the upload signer.
//!
//! [`AwsCredentialSource`] adapts an `aws-config` credentials provider (the
//! default chain, with its own caching and refresh) to
//! [`CredentialSource`]. [`S3ObjectStore`] adapts an `aws-sdk-s3` client to
//! [`ObjectStore`].

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::debug;
use upsign_auth::{AuthError, CredentialSource, Credentials};
use upsign_core::{ObjectHead, ObjectStore, StorageError};

/// Credential source backed by an AWS SDK credentials provider.
#[derive(Debug, Clone)]
pub struct AwsCredentialSource {
    provider: SharedCredentialsProvider,
}

impl AwsCredentialSource {
    /// Wrap an SDK credentials provider.
    #[must_use]
    pub fn new(provider: SharedCredentialsProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CredentialSource for AwsCredentialSource {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        let credentials = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| AuthError::CredentialsUnavailable(DisplayErrorContext(&e).to_string()))?;
        let signing = Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
        );
        Ok(match credentials.session_token() {
            Some(token) => signing.with_session_token(token),
            None => signing,
        })
    }
}

/// Object store backed by S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Wrap an S3 client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectHead, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_not_found() => StorageError::NotFound {
                    key: key.to_owned(),
                },
                _ => StorageError::Backend(DisplayErrorContext(&err).to_string()),
            })?;

        debug!(bucket, key, "fetched object metadata");
        Ok(ObjectHead {
            size: object_size(output.content_length()),
            content_type: output.content_type().unwrap_or_default().to_owned(),
            etag: output.e_tag().unwrap_or_default().to_owned(),
        })
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StorageError::Backend(DisplayErrorContext(&err).to_string()))?;
        debug!(bucket, key, "deleted object");
        Ok(())
    }
}

/// S3 reports sizes as a signed integer; absent or negative means empty.
fn object_size(content_length: Option<i64>) -> u64 {
    content_length
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}
