//! Upsign request router.
//!
//! The surface is a handful of fixed paths, so routing is a match on the
//! path followed by a method check:
//!
//! ```text
//! POST /s3/signature[?v4=true]   sign a policy or REST string
//! POST /s3/success               verify a completed upload
//! GET  /s3/config                public upload settings
//! GET  /s3/blank                 blank page for iframe uploads
//! GET  /health                   liveness
//! ```

use std::fmt;

/// A resolved Upsign endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadRoute {
    /// `POST /s3/signature`
    Sign,
    /// `POST /s3/success`
    UploadComplete,
    /// `GET /s3/config`
    Config,
    /// `GET /s3/blank`
    Blank,
    /// `GET /health`
    Health,
    /// `OPTIONS` on any known path.
    Preflight,
}

impl UploadRoute {
    /// Route name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sign => "sign",
            Self::UploadComplete => "upload_complete",
            Self::Config => "config",
            Self::Blank => "blank",
            Self::Health => "health",
            Self::Preflight => "preflight",
        }
    }
}

impl fmt::Display for UploadRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request could not be routed.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No endpoint at this path.
    #[error("No route for {path}")]
    NotFound {
        /// The requested path.
        path: String,
    },
    /// The endpoint exists but not for this method.
    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed {
        /// The requested method.
        method: http::Method,
        /// The requested path.
        path: String,
    },
}

impl RouteError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::MethodNotAllowed { .. } => "MethodNotAllowed",
        }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::NotFound { .. } => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => http::StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// Resolve the endpoint for a method and path.
///
/// A single trailing slash is ignored.
///
/// # Errors
///
/// Returns [`RouteError`] for unknown paths and disallowed methods.
pub fn resolve_route(method: &http::Method, path: &str) -> Result<UploadRoute, RouteError> {
    let trimmed = match path.strip_suffix('/') {
        Some(p) if !p.is_empty() => p,
        _ => path,
    };

    let (route, allowed) = match trimmed {
        "/s3/signature" => (UploadRoute::Sign, http::Method::POST),
        "/s3/success" => (UploadRoute::UploadComplete, http::Method::POST),
        "/s3/config" => (UploadRoute::Config, http::Method::GET),
        "/s3/blank" => (UploadRoute::Blank, http::Method::GET),
        "/health" => (UploadRoute::Health, http::Method::GET),
        _ => {
            return Err(RouteError::NotFound {
                path: path.to_owned(),
            });
        }
    };

    if *method == http::Method::OPTIONS {
        return Ok(UploadRoute::Preflight);
    }
    if *method == allowed || (allowed == http::Method::GET && *method == http::Method::HEAD) {
        return Ok(route);
    }
    Err(RouteError::MethodNotAllowed {
        method: method.clone(),
        path: path.to_owned(),
    })
}

/// Look up a query parameter. The first occurrence wins.
#[must_use]
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
