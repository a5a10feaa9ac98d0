//! Presigned URL generation for AWS Signature Version 4.
//!
//! Presigned URLs carry authentication in query parameters rather than
//! headers, which lets a browser GET or PUT a single object without holding
//! credentials. The generated query contains:
//!
//! - `X-Amz-Algorithm` - Always `AWS4-HMAC-SHA256`
//! - `X-Amz-Credential` - `AKID/date/region/s3/aws4_request`
//! - `X-Amz-Date` - ISO 8601 basic format timestamp (`YYYYMMDDTHHMMSSZ`)
//! - `X-Amz-Expires` - Validity duration in seconds
//! - `X-Amz-SignedHeaders` - Always `host`
//! - `X-Amz-Security-Token` - Only for temporary credentials
//! - `X-Amz-Signature` - The hex-encoded signature
//!
//! The payload hash is always `UNSIGNED-PAYLOAD`.

use std::fmt;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::canonical::{build_canonical_query_string, build_canonical_request, build_canonical_uri};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::sigv4::{
    CredentialScope, S3_SERVICE, SUPPORTED_ALGORITHM, build_string_to_sign, derive_v4,
};

/// The payload hash value used for all presigned URL requests.
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Longest validity S3 accepts for a SigV4 presigned URL (seven days).
pub const MAX_PRESIGN_EXPIRES_SECS: u64 = 604_800;

/// HTTP method a presigned URL authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignMethod {
    /// Download an object.
    Get,
    /// Upload an object.
    Put,
}

impl PresignMethod {
    /// The HTTP verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }

    /// Parse a verb case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("GET") {
            Some(Self::Get)
        } else if name.eq_ignore_ascii_case("PUT") {
            Some(Self::Put)
        } else {
            None
        }
    }
}

impl fmt::Display for PresignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to presign one object operation.
#[derive(Debug, Clone)]
pub struct PresignRequest<'a> {
    /// Verb the URL authorizes.
    pub method: PresignMethod,
    /// Virtual-hosted bucket hostname, e.g. `bucket.s3.amazonaws.com`.
    pub host: &'a str,
    /// Object key, without a leading slash.
    pub key: &'a str,
    /// Region used in the credential scope.
    pub region: &'a str,
    /// Validity in seconds.
    pub expires_in: u64,
    /// Signing time.
    pub timestamp: DateTime<Utc>,
}

/// Generate a presigned URL for the request.
///
/// # Errors
///
/// Returns [`AuthError::InvalidObjectKey`] for an empty key and
/// [`AuthError::InvalidExpiry`] if `expires_in` exceeds seven days.
pub fn presign_url(request: &PresignRequest<'_>, credentials: &Credentials) -> Result<String, AuthError> {
    let key = request.key.trim_start_matches('/');
    if key.is_empty() {
        return Err(AuthError::InvalidObjectKey(request.key.to_owned()));
    }
    if request.expires_in > MAX_PRESIGN_EXPIRES_SECS {
        return Err(AuthError::InvalidExpiry(request.expires_in));
    }

    let date = request.timestamp.format("%Y%m%d").to_string();
    let timestamp = request.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let scope = CredentialScope::new(date, request.region);
    let credential_scope = scope.to_scope_string();
    let credential = format!("{}/{credential_scope}", credentials.access_key_id());
    let expires = request.expires_in.to_string();

    let mut params = vec![
        ("X-Amz-Algorithm", SUPPORTED_ALGORITHM),
        ("X-Amz-Credential", credential.as_str()),
        ("X-Amz-Date", timestamp.as_str()),
        ("X-Amz-Expires", expires.as_str()),
        ("X-Amz-SignedHeaders", "host"),
    ];
    if let Some(token) = credentials.session_token() {
        params.push(("X-Amz-Security-Token", token));
    }
    let path = format!("/{key}");

    let canonical_request = build_canonical_request(
        request.method.as_str(),
        &path,
        &params,
        &[("host", request.host)],
        UNSIGNED_PAYLOAD,
    );

    debug!(canonical_request, "Built presigned canonical request");

    let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign = build_string_to_sign(&timestamp, &credential_scope, &canonical_hash);
    let signature = derive_v4(
        credentials.secret_access_key(),
        &scope.date,
        &scope.region,
        S3_SERVICE,
        &string_to_sign,
    );

    Ok(format!(
        "https://{}{}?{}&X-Amz-Signature={signature}",
        request.host,
        build_canonical_uri(&path),
        build_canonical_query_string(&params),
    ))
}
