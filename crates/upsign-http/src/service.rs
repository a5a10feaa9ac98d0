//! Upsign HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tracing::debug;
use upsign_core::{SignerError, UploadSigner};

use crate::body::UploadResponseBody;
use crate::dispatch::dispatch_route;
use crate::response::{
    CONTENT_TYPE, REQUEST_ID_HEADER, route_error_to_response, signer_error_to_response,
};
use crate::router::resolve_route;

/// Hyper `Service` implementation for Upsign.
///
/// Wraps a shared [`UploadSigner`] and routes incoming HTTP requests to the
/// appropriate endpoint handler.
#[derive(Debug, Clone)]
pub struct UploadHttpService {
    signer: Arc<UploadSigner>,
}

impl UploadHttpService {
    /// Create a new `UploadHttpService`.
    #[must_use]
    pub fn new(signer: Arc<UploadSigner>) -> Self {
        Self { signer }
    }

    /// Route and handle one request with an already collected body.
    pub async fn handle(
        &self,
        parts: http::request::Parts,
        body: Bytes,
        request_id: &str,
    ) -> http::Response<UploadResponseBody> {
        let route = match resolve_route(&parts.method, parts.uri.path()) {
            Ok(route) => route,
            Err(err) => {
                debug!(method = %parts.method, path = parts.uri.path(), "unrouted request");
                return route_error_to_response(&err, request_id);
            }
        };
        dispatch_route(&self.signer, route, &parts, body, request_id).await
    }
}

impl hyper::service::Service<http::Request<Incoming>> for UploadHttpService {
    type Response = http::Response<UploadResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let response = match collect_body(incoming).await {
                Ok(body) => service.handle(parts, body, &request_id).await,
                Err(err) => signer_error_to_response(&err, &request_id),
            };
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body(incoming: Incoming) -> Result<Bytes, SignerError> {
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| SignerError::MalformedRequest(format!("Failed to read request body: {e}")))
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<UploadResponseBody>,
    request_id: &str,
) -> http::Response<UploadResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("Upsign"));

    // CORS headers.
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        http::HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        http::HeaderValue::from_static("content-type, x-requested-with"),
    );

    response
}
