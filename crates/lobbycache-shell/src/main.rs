//! lobbycache - offline shell for the BiHunters lobby application.
//!
//! Registers the offline cache controller, warms the precache, and reports
//! the state of the offline bucket.

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use lobbycache_core::worker::CACHE_NAME;

use lobbycache_shell::config::{self, api_config};
use lobbycache_shell::registration::Registration;

/// Worker scope used when none is configured in the environment.
const DEFAULT_SCOPE: &str = "https://play.bihunters.io";

/// Environment variable overriding the worker scope.
const SCOPE_ENV: &str = "LOBBYCACHE_SCOPE";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("lobbycache starting");

    let config = api_config();
    info!(
        news_proxy = config.news.use_proxy,
        news_key_present = config.news.api_key.is_some(),
        "API configuration loaded"
    );

    let scope = std::env::var(SCOPE_ENV).unwrap_or_else(|_| DEFAULT_SCOPE.to_string());
    let scope = Url::parse(&scope)?;

    let cache_dir = config::cache_dir()?;
    let registration = Registration::register(scope, cache_dir).await?;

    let bucket = registration.controller().store().bucket(CACHE_NAME);
    info!(
        bucket = CACHE_NAME,
        entries = bucket.len()?,
        "Offline cache ready"
    );

    registration.shutdown().await;
    info!("lobbycache shutting down");
    Ok(())
}
