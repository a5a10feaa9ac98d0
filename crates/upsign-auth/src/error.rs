//! Error types for signing.
//!
//! All failures raised while obtaining credentials or parsing signing inputs
//! are represented by [`AuthError`].

/// Errors that can occur while producing an AWS signature.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential source could not produce credentials.
    #[error("Credentials unavailable: {0}")]
    CredentialsUnavailable(String),

    /// A credential scope did not match `.../{date}/{region}/s3/aws4_request`.
    #[error("Invalid credential scope: {0}")]
    InvalidCredentialScope(String),

    /// An object key cannot be used to build a presigned URL.
    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),

    /// A presigned URL validity period exceeds what S3 accepts.
    #[error("Invalid presigned URL expiry: {0} seconds")]
    InvalidExpiry(u64),
}
