//! Response serialization and error formatting.

use serde::Serialize;
use upsign_core::SignerError;

use crate::body::UploadResponseBody;
use crate::router::RouteError;

/// Content type for JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Content type for the blank iframe page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The page legacy iframe uploads are redirected to.
pub const BLANK_PAGE: &str = "<html><body></body></html>";

/// Serialize an error into a JSON response body.
///
/// ```json
/// {"error": "Invalid policy request", "code": "ValidationError", "invalid": true}
/// ```
///
/// `invalid` is only present for validation failures. Upload widgets use it
/// to tell a rejected policy apart from a server fault.
#[must_use]
pub fn error_to_json(code: &str, message: &str, invalid: bool) -> Vec<u8> {
    let mut body = serde_json::json!({
        "error": message,
        "code": code,
    });
    if invalid {
        body["invalid"] = serde_json::Value::Bool(true);
    }
    serde_json::to_vec(&body).expect("JSON serialization of error cannot fail")
}

/// Build a JSON error response.
#[must_use]
pub fn error_response(
    status: http::StatusCode,
    code: &str,
    message: &str,
    invalid: bool,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(UploadResponseBody::from_bytes(error_to_json(
            code, message, invalid,
        )))
        .expect("valid error response")
}

/// Convert a [`SignerError`] into a complete HTTP error response.
#[must_use]
pub fn signer_error_to_response(
    error: &SignerError,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    error_response(
        error.status_code(),
        error.code(),
        &error.to_string(),
        error.is_validation(),
        request_id,
    )
}

/// Convert a [`RouteError`] into a complete HTTP error response.
#[must_use]
pub fn route_error_to_response(
    error: &RouteError,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    error_response(
        error.status_code(),
        error.code(),
        &error.to_string(),
        false,
        request_id,
    )
}

/// Build a JSON response with the given status.
#[must_use]
pub fn json_response<T: Serialize>(
    status: http::StatusCode,
    value: &T,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let json = serde_json::to_vec(value).expect("JSON serialization of response cannot fail");
    http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(UploadResponseBody::from_bytes(json))
        .expect("valid JSON response")
}

/// Build the blank HTML page response.
#[must_use]
pub fn blank_page_response(request_id: &str) -> http::Response<UploadResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", HTML_CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(UploadResponseBody::from_bytes(BLANK_PAGE))
        .expect("valid HTML response")
}

/// Build an empty `204 No Content` response for CORS preflight.
#[must_use]
pub fn preflight_response(request_id: &str) -> http::Response<UploadResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NO_CONTENT)
        .header(REQUEST_ID_HEADER, request_id)
        .body(UploadResponseBody::empty())
        .expect("valid preflight response")
}
