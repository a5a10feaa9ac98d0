//! AWS Signature Version 2 signing.
//!
//! SigV2 is the older signing mechanism that uses HMAC-SHA1:
//!
//! ```text
//! Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))
//! ```
//!
//! For policy uploads the string to sign is the base64-encoded policy
//! document. For REST (multipart part) uploads it is the string the browser
//! assembled from the verb, content headers, date, amz headers and resource.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Compute the SigV2 signature: `Base64(HMAC-SHA1(secret_key, string_to_sign))`.
///
/// # Examples
///
/// ```
/// use upsign_auth::sigv2::derive_v2;
///
/// let signature = derive_v2("secret", "data");
/// assert_eq!(signature, derive_v2("secret", "data"));
/// ```
#[must_use]
pub fn derive_v2(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    let result = mac.finalize().into_bytes();
    BASE64.encode(result)
}
