//! Integration tests for Upsign server.
//!
//! These tests require a running Upsign server at `localhost:4580`, and the
//! upload verification tests additionally require an S3-compatible endpoint
//! the server verifies against (`S3_ENDPOINT_URL`, default `localhost:4566`).
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p upsign-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Base URL of the Upsign server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("UPSIGN_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4580".to_owned())
}

/// Endpoint URL of the S3-compatible store the server verifies against.
fn s3_endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Build a URL on the Upsign server.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", endpoint_url())
}

/// Create an HTTP client for the Upsign server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Create a configured S3 client pointing at the local S3 endpoint.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(s3_endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Fetch the server's public upload settings.
pub async fn upload_settings(client: &reqwest::Client) -> serde_json::Value {
    client
        .get(url("/s3/config"))
        .send()
        .await
        .expect("GET /s3/config")
        .json()
        .await
        .expect("config JSON")
}

/// Generate a unique object key for a test.
#[must_use]
pub fn test_object_key(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}.bin")
}

mod test_service;
mod test_sign;
mod test_verify;
