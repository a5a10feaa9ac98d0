//! Upsign Server - signs direct-to-S3 browser uploads.
//!
//! Browsers upload file bytes straight to the configured bucket. This server
//! only signs the upload policies and multipart requests it is willing to
//! authorize, and audits each upload once the browser reports it complete.
//!
//! # Usage
//!
//! ```text
//! UPLOAD_BUCKET=my-uploads UPLOAD_MAX_SIZE=15000000 upsign-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4580` | Bind address |
//! | `UPLOAD_BUCKET` | *(required)* | Bucket uploads must target |
//! | `UPLOAD_HOSTNAME` | `{bucket}.s3.amazonaws.com` | Host SigV4 requests must name |
//! | `UPLOAD_REGION` | `AWS_REGION`, then `us-east-1` | Region for presigned URLs |
//! | `UPLOAD_EXPIRES_SECONDS` | `900` | Presigned URL validity |
//! | `UPLOAD_MIN_SIZE` / `UPLOAD_MAX_SIZE` | *(unset)* | Size bounds |
//! | `UPLOAD_ACCESS_KEY_ID` / `UPLOAD_SECRET_ACCESS_KEY` | *(unset)* | Static signing credentials |
//! | `UPLOAD_SESSION_TOKEN` | *(unset)* | Session token for temporary static credentials |
//! | `S3_ENDPOINT_URL` | *(unset)* | Custom S3 endpoint for verification (path-style) |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! Without static credentials, the AWS default provider chain is used.

mod aws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use upsign_auth::{CredentialSource, Credentials, StaticCredentialSource};
use upsign_core::{SigningConfig, UploadSigner};
use upsign_http::UploadHttpService;

use crate::aws::{AwsCredentialSource, S3ObjectStore};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Read static credentials from the first key pair whose variables are both
/// set, along with that pair's session token.
fn static_credentials(lookup: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
    [
        ("UPLOAD_ACCESS_KEY_ID", "UPLOAD_SECRET_ACCESS_KEY", "UPLOAD_SESSION_TOKEN"),
        ("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"),
    ]
    .into_iter()
    .find_map(|(akid, secret, token)| {
        let credentials = Credentials::new(
            lookup(akid).filter(|v| !v.is_empty())?,
            lookup(secret).filter(|v| !v.is_empty())?,
        );
        Some(match lookup(token).filter(|v| !v.is_empty()) {
            Some(token) => credentials.with_session_token(token),
            None => credentials,
        })
    })
}

/// Build the credential source used for signing.
fn build_credential_source(sdk_config: &aws_config::SdkConfig) -> Result<Arc<dyn CredentialSource>> {
    if let Some(credentials) = static_credentials(|name| std::env::var(name).ok()) {
        info!(
            access_key = %credentials.access_key_id(),
            temporary = credentials.session_token().is_some(),
            "configured static credential source from environment"
        );
        return Ok(Arc::new(StaticCredentialSource::from(credentials)));
    }

    let provider = sdk_config
        .credentials_provider()
        .context("no AWS credentials provider available")?;
    info!("using AWS default credential provider chain");
    Ok(Arc::new(AwsCredentialSource::new(provider)))
}

/// Build the S3 client used to verify uploads.
fn build_s3_client(sdk_config: &aws_config::SdkConfig) -> aws_sdk_s3::Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
    if let Ok(endpoint) = std::env::var("S3_ENDPOINT_URL") {
        info!(%endpoint, "using custom S3 endpoint");
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: UploadHttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Read the listen address from the environment.
fn listen_addr() -> String {
    std::env::var("GATEWAY_LISTEN").unwrap_or_else(|_| "0.0.0.0:4580".to_string())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let config = SigningConfig::from_env().context("invalid upload configuration")?;
    info!(
        bucket = %config.bucket,
        hostname = %config.hostname(),
        region = %config.region,
        min_size = ?config.min_size,
        max_size = ?config.max_size,
        "initializing upload signer",
    );

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;
    let credentials = build_credential_source(&sdk_config)?;
    let store = Arc::new(S3ObjectStore::new(build_s3_client(&sdk_config)));

    let signer = UploadSigner::new(config, credentials, store)?;
    let service = UploadHttpService::new(Arc::new(signer));

    let listen_addr = listen_addr();
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {listen_addr}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, version = VERSION, "starting Upsign Server");

    serve(listener, service).await
}
