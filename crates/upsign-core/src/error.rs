//! Error types for the upload signer.
//!
//! [`SignerError`] is what the signing and verification entry points return.
//! Each variant maps to a stable error code and an HTTP status so the
//! transport layer can tell "bad shape" (400) apart from "disallowed target"
//! (403) and from server-side failures (5xx).

use upsign_auth::AuthError;

/// Errors raised by an object store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object does not exist (yet).
    #[error("Object not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// Any other store failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether this is the missing-object case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while signing or verifying an upload.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The credential source could not produce credentials.
    #[error("Credentials unavailable: {0}")]
    Credential(String),

    /// The request body is not a JSON object.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The policy document does not have the expected structure.
    #[error("Malformed policy: {0}")]
    MalformedPolicy(String),

    /// The REST string-to-sign does not have the expected structure.
    #[error("Malformed headers: {0}")]
    MalformedHeaders(String),

    /// The request targets a bucket, host, or size range this server does not allow.
    #[error("Invalid {0} request")]
    Validation(&'static str),

    /// A presigned URL could not be issued for the given parameters.
    #[error("Invalid presign request: {0}")]
    InvalidPresign(String),

    /// An object store operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SignerError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Credential(_) => "CredentialError",
            Self::MalformedRequest(_) => "MalformedRequest",
            Self::MalformedPolicy(_) => "MalformedPolicy",
            Self::MalformedHeaders(_) => "MalformedHeaders",
            Self::Validation(_) => "ValidationError",
            Self::InvalidPresign(_) => "InvalidPresignRequest",
            Self::Storage(StorageError::NotFound { .. }) => "NotFound",
            Self::Storage(StorageError::Backend(_)) => "StorageError",
        }
    }

    /// HTTP status code the transport layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::Credential(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedRequest(_)
            | Self::MalformedPolicy(_)
            | Self::MalformedHeaders(_)
            | Self::InvalidPresign(_) => http::StatusCode::BAD_REQUEST,
            Self::Validation(_) => http::StatusCode::FORBIDDEN,
            Self::Storage(StorageError::NotFound { .. }) => http::StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Backend(_)) => http::StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the request was rejected by a validator (as opposed to malformed).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Map a credential-source failure.
    pub(crate) fn from_credentials(err: AuthError) -> Self {
        match err {
            AuthError::CredentialsUnavailable(reason) => Self::Credential(reason),
            other => Self::Credential(other.to_string()),
        }
    }
}

/// Errors raised while building a [`SigningConfig`](crate::SigningConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// The setting name.
        name: &'static str,
        /// The raw value.
        value: String,
    },

    /// The settings are individually valid but inconsistent.
    #[error("configuration error: {0}")]
    Inconsistent(String),
}
