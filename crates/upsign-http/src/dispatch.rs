//! Per-route request handling.
//!
//! Each handler decodes its inputs from the request, calls the
//! [`UploadSigner`], and encodes the result. Failures become JSON error
//! responses; a signature is only ever written on success.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;
use upsign_core::{
    PublicCredentials, SignatureVersion, SignerError, UploadSigner, UploadVerificationResult,
};

use crate::body::UploadResponseBody;
use crate::response::{
    blank_page_response, json_response, preflight_response, signer_error_to_response,
};
use crate::router::{UploadRoute, query_param};

/// Form content type accepted by the upload-complete endpoint.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type HandlerResult = Result<http::Response<UploadResponseBody>, SignerError>;

/// Public settings a browser upload widget needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadSettings {
    endpoint: String,
    bucket: String,
    region: String,
    #[serde(flatten)]
    credentials: PublicCredentials,
}

/// Verification result of a deleted upload.
#[derive(Debug, Serialize)]
struct RejectedUpload<'a> {
    #[serde(flatten)]
    result: &'a UploadVerificationResult,
    error: String,
}

/// Dispatch a routed request to its handler.
pub async fn dispatch_route(
    signer: &UploadSigner,
    route: UploadRoute,
    parts: &http::request::Parts,
    body: Bytes,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    debug!(%route, "dispatching upload route");
    let result = match route {
        UploadRoute::Sign => handle_sign(signer, parts, &body, request_id).await,
        UploadRoute::UploadComplete => {
            handle_upload_complete(signer, parts, &body, request_id).await
        }
        UploadRoute::Config => handle_config(signer, request_id).await,
        UploadRoute::Blank => Ok(blank_page_response(request_id)),
        UploadRoute::Health => Ok(json_response(
            http::StatusCode::OK,
            &serde_json::json!({"status": "running"}),
            request_id,
        )),
        UploadRoute::Preflight => Ok(preflight_response(request_id)),
    };

    result.unwrap_or_else(|err| signer_error_to_response(&err, request_id))
}

async fn handle_sign(
    signer: &UploadSigner,
    parts: &http::request::Parts,
    body: &[u8],
    request_id: &str,
) -> HandlerResult {
    let version = SignatureVersion::from_flag(query_param(parts.uri.query(), "v4").as_deref());
    let result = signer.handle_sign_request(body, version).await?;
    Ok(json_response(http::StatusCode::OK, &result, request_id))
}

async fn handle_upload_complete(
    signer: &UploadSigner,
    parts: &http::request::Parts,
    body: &[u8],
    request_id: &str,
) -> HandlerResult {
    let key = extract_key(&parts.headers, body)?;
    let result = signer.handle_upload_complete(&key).await?;

    if result.accepted {
        return Ok(json_response(http::StatusCode::OK, &result, request_id));
    }
    let rejected = RejectedUpload {
        result: &result,
        error: format!(
            "Upload of {} bytes exceeds the maximum size and was deleted",
            result.size
        ),
    };
    Ok(json_response(
        http::StatusCode::PAYLOAD_TOO_LARGE,
        &rejected,
        request_id,
    ))
}

async fn handle_config(signer: &UploadSigner, request_id: &str) -> HandlerResult {
    let config = signer.config();
    let settings = UploadSettings {
        endpoint: signer.endpoint(),
        bucket: config.bucket.clone(),
        region: config.region.clone(),
        credentials: signer.public_credentials().await?,
    };
    Ok(json_response(http::StatusCode::OK, &settings, request_id))
}

/// Read the object key from a JSON or form-encoded upload-complete body.
fn extract_key(headers: &http::HeaderMap, body: &[u8]) -> Result<String, SignerError> {
    let is_form = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

    let key = if is_form {
        form_urlencoded::parse(body)
            .find(|(k, _)| k == "key")
            .map(|(_, v)| v.into_owned())
    } else {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| SignerError::MalformedRequest(format!("invalid JSON body: {e}")))?;
        value
            .get("key")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    };

    key.filter(|k| !k.is_empty())
        .ok_or_else(|| SignerError::MalformedRequest("missing key".to_owned()))
}
