//! Signing configuration.
//!
//! Provides [`SigningConfig`], the server-held expectations every signing
//! request is checked against. It is built once at startup and never mutated.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;

/// Default validity of presigned URLs, in seconds.
const DEFAULT_EXPIRES_SECONDS: u64 = 900;

/// Default AWS region.
const DEFAULT_REGION: &str = "us-east-1";

/// Server-side upload constraints.
///
/// # Examples
///
/// ```
/// use upsign_core::config::SigningConfig;
///
/// let config = SigningConfig::builder()
///     .bucket("uploads".into())
///     .max_size(1_000_000)
///     .build();
/// assert_eq!(config.hostname(), "uploads.s3.amazonaws.com");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    /// Bucket every upload must target.
    pub bucket: String,

    /// Bucket hostname expected in SigV4 REST requests. Defaults to
    /// `{bucket}.s3.amazonaws.com`.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub hostname: Option<String>,

    /// Region used for presigned URLs.
    #[builder(default = String::from(DEFAULT_REGION))]
    pub region: String,

    /// Validity of presigned URLs, in seconds.
    #[builder(default = DEFAULT_EXPIRES_SECONDS)]
    pub expires_seconds: u64,

    /// Minimum object size in bytes the policy must declare.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub min_size: Option<u64>,

    /// Maximum object size in bytes; also enforced after upload.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub max_size: Option<u64>,
}

impl SigningConfig {
    /// The hostname SigV4 REST requests must name in their `host:` header.
    #[must_use]
    pub fn hostname(&self) -> String {
        self.hostname
            .clone()
            .unwrap_or_else(|| format!("{}.s3.amazonaws.com", self.bucket))
    }

    /// Base URL browsers upload to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.hostname())
    }

    /// Both size bounds, when (and only when) both are configured.
    #[must_use]
    pub fn size_range(&self) -> Option<(u64, u64)> {
        self.min_size.zip(self.max_size)
    }

    /// Check the invariants the signer relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the bucket is empty or `min_size > max_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Missing("bucket"));
        }
        if let Some((min, max)) = self.size_range() {
            if min > max {
                return Err(ConfigError::Inconsistent(format!(
                    "min size {min} exceeds max size {max}"
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `UPLOAD_BUCKET` | *(required)* |
    /// | `UPLOAD_HOSTNAME` | `{bucket}.s3.amazonaws.com` |
    /// | `UPLOAD_REGION` | `AWS_REGION`, then `us-east-1` |
    /// | `UPLOAD_EXPIRES_SECONDS` | `900` |
    /// | `UPLOAD_MIN_SIZE` | *(unset)* |
    /// | `UPLOAD_MAX_SIZE` | *(unset)* |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the bucket is missing, a number does not
    /// parse, or the result fails [`SigningConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bucket = non_empty("UPLOAD_BUCKET").ok_or(ConfigError::Missing("UPLOAD_BUCKET"))?;
        let region = non_empty("UPLOAD_REGION")
            .or_else(|| non_empty("AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());

        let config = Self {
            bucket,
            hostname: non_empty("UPLOAD_HOSTNAME"),
            region,
            expires_seconds: parse_u64("UPLOAD_EXPIRES_SECONDS", non_empty("UPLOAD_EXPIRES_SECONDS"))?
                .unwrap_or(DEFAULT_EXPIRES_SECONDS),
            min_size: parse_u64("UPLOAD_MIN_SIZE", non_empty("UPLOAD_MIN_SIZE"))?,
            max_size: parse_u64("UPLOAD_MAX_SIZE", non_empty("UPLOAD_MAX_SIZE"))?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_u64(name: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue { name, value: v })
        })
        .transpose()
}
