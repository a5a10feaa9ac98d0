//! AWS Signature Version 2 and 4 signing primitives for Upsign.
//!
//! This crate holds the cryptographic half of the upload signer: it never
//! looks at policies or buckets, it only turns a secret key and a message into
//! a signature.
//!
//! # Overview
//!
//! Browsers that upload straight to S3 need the server to sign either a
//! base64-encoded policy document (simple uploads) or a string-to-sign built
//! by the browser (multipart "REST" uploads). Both legacy SigV2 (HMAC-SHA1)
//! and SigV4 (the four-stage HMAC-SHA256 chain) are supported.
//!
//! # Usage
//!
//! ```rust
//! use upsign_auth::sigv4::derive_v4;
//!
//! let signature = derive_v4(
//!     "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
//!     "20130524",
//!     "us-east-1",
//!     "s3",
//!     "string to sign",
//! );
//! assert_eq!(signature.len(), 64);
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request helpers shared by presigned URL generation
//! - [`credentials`] - Credential source trait and static implementation
//! - [`error`] - Signing error types
//! - [`presigned`] - SigV4 presigned GET/PUT URL generation
//! - [`sigv2`] - Legacy SigV2 signing (HMAC-SHA1)
//! - [`sigv4`] - SigV4 key derivation and credential scope parsing

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod presigned;
pub mod sigv2;
pub mod sigv4;

pub use credentials::{CredentialSource, Credentials, StaticCredentialSource};
pub use error::AuthError;
pub use presigned::{PresignMethod, PresignRequest, presign_url};
pub use sigv2::derive_v2;
pub use sigv4::{CredentialScope, S3_SERVICE, derive_v4, hash_payload};
