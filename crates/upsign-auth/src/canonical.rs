//! Canonical request construction for AWS Signature Version 4.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Only the pieces needed to issue query-string-authenticated (presigned)
//! URLs live here; browser-built canonical requests arrive pre-assembled and
//! are hashed verbatim.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters that must be percent-encoded in URI path segments and query
/// components: everything except the unreserved set (`A-Z a-z 0-9 - _ . ~`).
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the full canonical request string from its components.
///
/// `query_params` are raw (unencoded) pairs; they are encoded and sorted here.
///
/// # Examples
///
/// ```
/// use upsign_auth::canonical::build_canonical_request;
///
/// let canonical = build_canonical_request(
///     "GET",
///     "/test.txt",
///     &[],
///     &[("host", "examplebucket.s3.amazonaws.com")],
///     "UNSIGNED-PAYLOAD",
/// );
/// assert!(canonical.starts_with("GET\n/test.txt\n\nhost:"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query_params: &[(&str, &str)],
    headers: &[(&str, &str)],
    payload_hash: &str,
) -> String {
    let canonical_uri = build_canonical_uri(path);
    let canonical_query = build_canonical_query_string(query_params);
    let canonical_headers = build_canonical_headers(headers);
    let signed_headers = build_signed_headers_string(headers);

    format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}"
    )
}

/// Build the canonical URI by URI-encoding each path segment individually.
///
/// Forward slashes are preserved and an empty path is normalized to `/`.
///
/// # Examples
///
/// ```
/// use upsign_auth::canonical::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri("/uploads/my file.png"), "/uploads/my%20file.png");
/// assert_eq!(build_canonical_uri(""), "/");
/// ```
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Build the canonical query string: encode each key and value, then sort.
#[must_use]
pub fn build_canonical_query_string(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the canonical headers string: lowercase names, trimmed values,
/// sorted by name, no trailing newline.
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)]) -> String {
    let header_map: BTreeMap<String, &str> = headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim()))
        .collect();

    header_map
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the signed headers string as a sorted, semicolon-separated list of
/// lowercase header names.
#[must_use]
pub fn build_signed_headers_string(headers: &[(&str, &str)]) -> String {
    let mut names: Vec<String> = headers.iter().map(|(name, _)| name.to_lowercase()).collect();
    names.sort_unstable();
    names.dedup();
    names.join(";")
}

/// URI-encode a string using the AWS SigV4 encoding rules.
#[must_use]
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_canonical_uri_for_simple_path() {
        assert_eq!(build_canonical_uri("/test.txt"), "/test.txt");
    }

    #[test]
    fn test_should_normalize_empty_path_to_slash() {
        assert_eq!(build_canonical_uri(""), "/");
        assert_eq!(build_canonical_uri("/"), "/");
    }

    #[test]
    fn test_should_keep_slashes_between_encoded_segments() {
        assert_eq!(
            build_canonical_uri("/a b/c+d/e~f"),
            "/a%20b/c%2Bd/e~f"
        );
    }

    #[test]
    fn test_should_encode_and_sort_query_parameters() {
        let query = build_canonical_query_string(&[
            ("X-Amz-Expires", "86400"),
            ("X-Amz-Credential", "AKID/20130524/us-east-1/s3/aws4_request"),
        ]);
        assert_eq!(
            query,
            "X-Amz-Credential=AKID%2F20130524%2Fus-east-1%2Fs3%2Faws4_request&X-Amz-Expires=86400"
        );
    }

    #[test]
    fn test_should_build_sorted_lowercase_headers() {
        let headers = [("X-Amz-Date", " 20130524T000000Z "), ("Host", "example.com")];
        assert_eq!(
            build_canonical_headers(&headers),
            "host:example.com\nx-amz-date:20130524T000000Z"
        );
        assert_eq!(build_signed_headers_string(&headers), "host;x-amz-date");
    }

    #[test]
    fn test_should_build_canonical_request_matching_aws_example() {
        use sha2::{Digest, Sha256};

        let empty_hash = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let headers = [
            ("host", "examplebucket.s3.amazonaws.com"),
            ("range", "bytes=0-9"),
            ("x-amz-content-sha256", empty_hash),
            ("x-amz-date", "20130524T000000Z"),
        ];

        let canonical = build_canonical_request("GET", "/test.txt", &[], &headers, empty_hash);

        let hash = hex::encode(Sha256::digest(canonical.as_bytes()));
        assert_eq!(
            hash,
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );
    }
}
