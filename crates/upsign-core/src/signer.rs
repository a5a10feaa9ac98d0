//! Turning a classified request into a signature.
//!
//! Signing happens in two steps. Planning ([`plan_policy`], [`plan_rest`])
//! parses everything the signature depends on, such as the SigV4 credential
//! scope, and fails closed on malformed input. A [`SigningPlan`] therefore
//! always signs successfully once credentials are available.

use serde::Serialize;
use upsign_auth::{CredentialScope, Credentials, S3_SERVICE, derive_v2, derive_v4, hash_payload};

use crate::error::SignerError;
use crate::policy::PolicyDocument;
use crate::request::SignatureVersion;

/// Which key derivation a plan signs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningScheme {
    /// HMAC-SHA1 keyed by the secret.
    V2,
    /// HMAC-SHA256 keyed by the signing key derived for this scope.
    V4(CredentialScope),
}

/// A fully parsed request, ready to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPlan {
    string_to_sign: String,
    scheme: SigningScheme,
    policy_base64: Option<String>,
}

/// Response to a successful signing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SignatureResult {
    /// Result for a policy request.
    Policy {
        /// Base64 of the policy exactly as signed.
        policy: String,
        /// The signature over `policy`.
        signature: String,
    },
    /// Result for a REST request.
    Rest {
        /// The signature over the string to sign.
        signature: String,
    },
}

impl SignatureResult {
    /// The signature, whatever the request shape.
    #[must_use]
    pub fn signature(&self) -> &str {
        match self {
            Self::Policy { signature, .. } | Self::Rest { signature } => signature,
        }
    }
}

impl SigningPlan {
    /// The exact text that will be signed.
    #[must_use]
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// The key derivation this plan uses.
    #[must_use]
    pub fn scheme(&self) -> &SigningScheme {
        &self.scheme
    }

    /// Sign with the given credentials.
    #[must_use]
    pub fn sign(self, credentials: &Credentials) -> SignatureResult {
        let secret = credentials.secret_access_key();
        let signature = match &self.scheme {
            SigningScheme::V2 => derive_v2(secret, &self.string_to_sign),
            SigningScheme::V4(scope) => derive_v4(
                secret,
                &scope.date,
                &scope.region,
                S3_SERVICE,
                &self.string_to_sign,
            ),
        };

        match self.policy_base64 {
            Some(policy) => SignatureResult::Policy { policy, signature },
            None => SignatureResult::Rest { signature },
        }
    }
}

/// Plan the signature of a policy document.
///
/// The signed text is the base64 of the policy. Under V4 the credential scope
/// comes from the first `x-amz-credential` condition.
///
/// # Errors
///
/// Returns [`SignerError::MalformedPolicy`] under V4 if no condition carries
/// an `x-amz-credential`, or it is not of the form
/// `AKID/date/region/s3/aws4_request`.
pub fn plan_policy(
    policy: &PolicyDocument,
    version: SignatureVersion,
) -> Result<SigningPlan, SignerError> {
    let scheme = match version {
        SignatureVersion::V2 => SigningScheme::V2,
        SignatureVersion::V4 => {
            let credential = policy.credential().ok_or_else(|| {
                SignerError::MalformedPolicy("missing x-amz-credential condition".to_owned())
            })?;
            let scope = CredentialScope::from_credential(credential)
                .map_err(|e| SignerError::MalformedPolicy(e.to_string()))?;
            SigningScheme::V4(scope)
        }
    };

    let policy_base64 = policy.to_base64();
    Ok(SigningPlan {
        string_to_sign: policy_base64.clone(),
        scheme,
        policy_base64: Some(policy_base64),
    })
}

/// Plan the signature of a REST request's string to sign.
///
/// Under V2 the string is signed as is. Under V4 it must have four parts:
///
/// ```text
/// AWS4-HMAC-SHA256
/// <timestamp>
/// <date>/<region>/s3/aws4_request
/// <canonical request, possibly spanning many lines>
/// ```
///
/// The canonical request is replaced by its hex SHA-256 before signing.
///
/// # Errors
///
/// Returns [`SignerError::MalformedHeaders`] under V4 if the string does not
/// have that shape.
pub fn plan_rest(headers: &str, version: SignatureVersion) -> Result<SigningPlan, SignerError> {
    match version {
        SignatureVersion::V2 => Ok(SigningPlan {
            string_to_sign: headers.to_owned(),
            scheme: SigningScheme::V2,
            policy_base64: None,
        }),
        SignatureVersion::V4 => {
            let (algorithm, timestamp, scope_line, canonical_request) = split_v4_headers(headers)?;
            let scope = CredentialScope::from_scope_line(scope_line)
                .map_err(|e| SignerError::MalformedHeaders(e.to_string()))?;
            let hashed = hash_payload(canonical_request.as_bytes());
            Ok(SigningPlan {
                string_to_sign: format!("{algorithm}\n{timestamp}\n{scope_line}\n{hashed}"),
                scheme: SigningScheme::V4(scope),
                policy_base64: None,
            })
        }
    }
}

fn split_v4_headers(headers: &str) -> Result<(&str, &str, &str, &str), SignerError> {
    let mut parts = headers.splitn(4, '\n');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(algorithm), Some(timestamp), Some(scope), Some(tail))
            if !algorithm.is_empty() && !timestamp.is_empty() && !tail.is_empty() =>
        {
            Ok((algorithm, timestamp, scope, tail))
        }
        _ => Err(SignerError::MalformedHeaders(
            "expected algorithm, timestamp, credential scope and canonical request lines"
                .to_owned(),
        )),
    }
}
