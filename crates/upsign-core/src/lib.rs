//! Upload signing, policy validation, and post-upload verification for Upsign.
//!
//! Browsers upload file bytes straight to an S3 bucket; this crate decides
//! which of those uploads the server is willing to authorize and audits the
//! result afterwards. It never sees file contents.
//!
//! The flow for a signing request is:
//!
//! 1. [`request::classify`] turns the inbound JSON into a [`SignatureRequest`]
//!    (policy document vs. REST/multipart string-to-sign, SigV2 vs. SigV4).
//! 2. [`signer`] parses the structural parts needed to sign (credential scope)
//!    and fails closed if they are malformed.
//! 3. [`validation`] checks bucket, size range, or host against
//!    [`SigningConfig`].
//! 4. Credentials are fetched from the injected
//!    [`CredentialSource`](upsign_auth::CredentialSource) and the plan is signed.
//!
//! Once an upload completes, [`UploadVerifier`] reads the object's metadata
//! from the injected [`ObjectStore`] and deletes it if it exceeds the
//! configured maximum size.
//!
//! [`UploadSigner`] wires all of the above together.

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod request;
pub mod signer;
pub mod storage;
pub mod validation;
pub mod verifier;

pub use config::SigningConfig;
pub use engine::{PublicCredentials, UploadSigner};
pub use error::{ConfigError, SignerError, StorageError};
pub use policy::{Condition, PolicyDocument};
pub use request::{SignatureRequest, SignatureVersion};
pub use signer::{SignatureResult, SigningPlan};
pub use storage::{InMemoryObjectStore, ObjectHead, ObjectStore};
pub use verifier::{UploadVerificationResult, UploadVerifier};
