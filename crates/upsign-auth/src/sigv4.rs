//! AWS Signature Version 4 signing.
//!
//! This module implements the signing half of SigV4:
//!
//! 1. Derive the signing key from the secret key and the credential scope
//!    components with a four-stage HMAC-SHA256 chain.
//! 2. HMAC the string to sign with the derived key and hex-encode the result.
//!
//! It also parses credential scopes, which arrive either as the value of an
//! `x-amz-credential` policy condition (`AKID/date/region/s3/aws4_request`)
//! or as the third line of a browser-built string to sign
//! (`date/region/s3/aws4_request`).
//!
//! The main entry point is [`derive_v4`].

use std::sync::LazyLock;

use hmac::{Hmac, KeyInit, Mac};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// The only algorithm supported by this implementation.
pub const SUPPORTED_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name used in every credential scope issued by this crate.
pub const S3_SERVICE: &str = "s3";

/// Terminator of every SigV4 credential scope.
const SCOPE_TERMINATOR: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// `AKID/{date}/{region}/s3/aws4_request`
static CREDENTIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+/([^/]+)/([^/]+)/s3/aws4_request$").expect("credential pattern is valid")
});

/// `{date}/{region}/s3/aws4_request`
static SCOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)/([^/]+)/s3/aws4_request$").expect("scope pattern is valid")
});

/// The date and region components of an S3 credential scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    /// The date stamp (YYYYMMDD).
    pub date: String,
    /// The AWS region.
    pub region: String,
}

impl CredentialScope {
    /// Create a scope from its parts.
    pub fn new(date: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            region: region.into(),
        }
    }

    /// Parse a full credential (`AKID/date/region/s3/aws4_request`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentialScope`] if the value does not have that shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use upsign_auth::sigv4::CredentialScope;
    ///
    /// let scope =
    ///     CredentialScope::from_credential("AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request")
    ///         .unwrap();
    /// assert_eq!(scope.date, "20130524");
    /// assert_eq!(scope.region, "us-east-1");
    /// ```
    pub fn from_credential(credential: &str) -> Result<Self, AuthError> {
        let captures = CREDENTIAL_PATTERN
            .captures(credential)
            .ok_or_else(|| AuthError::InvalidCredentialScope(credential.to_owned()))?;
        Ok(Self::new(&captures[1], &captures[2]))
    }

    /// Parse a bare scope line (`date/region/s3/aws4_request`, numeric date).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentialScope`] if the line does not have that shape.
    pub fn from_scope_line(line: &str) -> Result<Self, AuthError> {
        let captures = SCOPE_PATTERN
            .captures(line)
            .ok_or_else(|| AuthError::InvalidCredentialScope(line.to_owned()))?;
        Ok(Self::new(&captures[1], &captures[2]))
    }

    /// Render the scope as `date/region/s3/aws4_request`.
    #[must_use]
    pub fn to_scope_string(&self) -> String {
        format!(
            "{}/{}/{S3_SERVICE}/{SCOPE_TERMINATOR}",
            self.date, self.region
        )
    }
}

/// Build the SigV4 string to sign.
///
/// Format:
/// ```text
/// AWS4-HMAC-SHA256\n
/// <ISO8601 timestamp>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SUPPORTED_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key using the HMAC-SHA256 chain.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Compute the HMAC-SHA256 signature of `data` using the given `signing_key`.
///
/// Returns the hex-encoded signature.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Derive the signing key for the given scope and sign `string_to_sign` with it.
///
/// Pure and deterministic: the same inputs always yield the same hex signature.
#[must_use]
pub fn derive_v4(
    secret_key: &str,
    date: &str,
    region: &str,
    service: &str,
    string_to_sign: &str,
) -> String {
    let signing_key = derive_signing_key(secret_key, date, region, service);
    compute_signature(&signing_key, string_to_sign)
}

/// Compute the SHA-256 hash of the given payload and return it as a hex string.
///
/// # Examples
///
/// ```
/// use upsign_auth::sigv4::hash_payload;
///
/// // SHA-256 of empty payload
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
