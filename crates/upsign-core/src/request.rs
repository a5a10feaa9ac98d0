//! Inbound signing request classification.

use std::fmt;

use serde_json::Value;

use crate::error::SignerError;
use crate::policy::PolicyDocument;

/// The AWS signature scheme a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVersion {
    /// Legacy HMAC-SHA1 signatures.
    V2,
    /// HMAC-SHA256 signatures with a derived, scoped signing key.
    V4,
}

impl SignatureVersion {
    /// Resolve the version from the `v4` query flag. Any non-empty value selects V4.
    #[must_use]
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(v) if !v.is_empty() => Self::V4,
            _ => Self::V2,
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("v2"),
            Self::V4 => f.write_str("v4"),
        }
    }
}

/// A classified signing request.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureRequest {
    /// A simple upload: sign the base64 of a policy document.
    Policy {
        /// The submitted policy.
        policy: PolicyDocument,
        /// The requested scheme.
        version: SignatureVersion,
    },
    /// A REST (multipart part, initiate, complete) request: sign a
    /// caller-built string.
    Rest {
        /// The caller-built string to sign.
        headers: String,
        /// The requested scheme.
        version: SignatureVersion,
    },
}

impl SignatureRequest {
    /// The requested scheme.
    #[must_use]
    pub fn version(&self) -> SignatureVersion {
        match self {
            Self::Policy { version, .. } | Self::Rest { version, .. } => *version,
        }
    }

    /// Short label for logs and validation errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Policy { .. } => "policy",
            Self::Rest { .. } => "chunked",
        }
    }
}

/// Classify a raw request body.
///
/// A body carrying a non-empty string `headers` member is a REST request;
/// a body with no `headers` member (or a null or empty one) is a policy
/// document.
///
/// # Errors
///
/// - [`SignerError::MalformedRequest`] if the body is not a JSON object.
/// - [`SignerError::MalformedHeaders`] if `headers` is present with a non-string type.
/// - [`SignerError::MalformedPolicy`] if a policy body does not parse.
pub fn classify(body: &[u8], version: SignatureVersion) -> Result<SignatureRequest, SignerError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SignerError::MalformedRequest(format!("invalid JSON body: {e}")))?;
    let Value::Object(map) = value else {
        return Err(SignerError::MalformedRequest(
            "body must be a JSON object".to_owned(),
        ));
    };

    let headers = match map.get("headers") {
        Some(Value::String(headers)) if !headers.is_empty() => Some(headers.clone()),
        None | Some(Value::Null | Value::String(_)) => None,
        Some(other) => {
            return Err(SignerError::MalformedHeaders(format!(
                "headers must be a string, got {other}"
            )));
        }
    };

    match headers {
        Some(headers) => Ok(SignatureRequest::Rest { headers, version }),
        None => Ok(SignatureRequest::Policy {
            policy: PolicyDocument::from_json(map)?,
            version,
        }),
    }
}
