//! Checks that a signing request targets what this server allows.
//!
//! Both validators are pure predicates over the request and the
//! [`SigningConfig`]. They never see credentials.

use tracing::debug;

use crate::config::SigningConfig;
use crate::policy::PolicyDocument;
use crate::request::SignatureVersion;

/// Whether a policy names the configured bucket and, when both size bounds
/// are configured, declares exactly that `content-length-range`.
///
/// Bounds are compared as strings: `["content-length-range", "0", "1000"]`
/// matches `min_size = 0, max_size = 1000`, but `"1e3"` or a JSON number does
/// not. If only one bound is configured, size is not checked at all.
#[must_use]
pub fn is_policy_valid(policy: &PolicyDocument, config: &SigningConfig) -> bool {
    let bucket = policy.bucket();
    if bucket.and_then(serde_json::Value::as_str) != Some(config.bucket.as_str()) {
        debug!(expected = %config.bucket, actual = ?bucket, "policy bucket mismatch");
        return false;
    }

    let Some((min, max)) = config.size_range() else {
        return true;
    };
    let (min, max) = (min.to_string(), max.to_string());
    match policy.content_length_range() {
        Some((Some(lo), Some(hi))) if lo == min && hi == max => true,
        declared => {
            debug!(%min, %max, ?declared, "policy content-length-range mismatch");
            false
        }
    }
}

/// Whether a REST string to sign targets the configured host (V4) or bucket (V2).
///
/// - V4: the string contains `host:{hostname}`.
/// - V2: the string contains `/{bucket}/` followed by at least one more
///   character on the same line.
#[must_use]
pub fn is_rest_request_valid(
    headers: &str,
    version: SignatureVersion,
    config: &SigningConfig,
) -> bool {
    let valid = match version {
        SignatureVersion::V4 => headers.contains(&format!("host:{}", config.hostname())),
        SignatureVersion::V2 => {
            let needle = format!("/{}/", config.bucket);
            headers.match_indices(&needle).any(|(at, _)| {
                let rest = &headers[at + needle.len()..];
                !rest.is_empty() && !rest.contains('\n')
            })
        }
    };
    if !valid {
        debug!(%version, "rest request does not target the configured bucket");
    }
    valid
}
