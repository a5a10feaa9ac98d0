//! HTTP service layer for Upsign.
//!
//! A thin adapter exposing [`upsign_core::UploadSigner`] over HTTP/1.1 and HTTP/2:
//!
//! - **Router**: Maps method and path to an [`router::UploadRoute`]
//! - **Dispatch**: Decodes each route's inputs and calls the signer
//! - **Service**: Hyper `Service` implementation adding request ids and CORS headers
//! - **Response helpers**: JSON success/error response formatting
#![allow(missing_docs)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::UploadResponseBody;
pub use router::UploadRoute;
pub use service::UploadHttpService;
