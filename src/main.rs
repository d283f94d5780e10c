//! Trellis API Server
//!
//! Run with: cargo run --bin trellis
//!
//! # Configuration
//!
//! Loaded from a TOML file (`--config`, or the default locations) with
//! environment variable overrides:
//! - `TRELLIS_CONTROLLER_URL`: Store controller base URL (default: http://localhost:9000)
//! - `TRELLIS_BROKER_URL`: Store broker base URL (default: http://localhost:8099)
//! - `TRELLIS_AUTH_TOKEN`: Bearer token for store requests (optional)
//! - `TRELLIS_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TRELLIS_API_PORT`: Port to listen on (default: 8090)
//! - `TRELLIS_LOG_LEVEL`: Log level (default: info)
//! - `TRELLIS_LOG_FORMAT`: "pretty" or "json" (default: pretty)
//! - `RUST_LOG`: Full filter directive, takes precedence over TRELLIS_LOG_LEVEL

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trellis::api::{serve, AppState};
use trellis::config::{generate_default_config, Config, LoggingConfig};
use trellis::store::{StoreClient, StoreClientConfig};

/// Dashboard query service for columnar analytics stores
#[derive(Parser)]
#[command(name = "trellis", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a default config file to stdout and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("failed to load config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging)?;

    tracing::info!("Starting Trellis API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Store controller: {}", config.store.controller_url);
    tracing::info!("Store broker: {}", config.store.broker_url);

    let client = StoreClient::new(StoreClientConfig {
        controller_url: config.store.controller_url.clone(),
        broker_url: config.store.broker_url.clone(),
        auth_token: config.store.auth_token.clone(),
        request_timeout_ms: config.store.request_timeout_ms,
    });

    // The server starts even when the store is down; queries fail until it
    // comes back and health reports degraded
    match client.health_check().await {
        Ok(()) => tracing::info!("Store connection verified"),
        Err(e) => tracing::warn!("Store not available: {}", e),
    }

    let state = AppState::new(Arc::new(client), config.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    tracing::info!("Trellis API server stopped");
    Ok(())
}

/// Initialize the tracing subscriber from logging config
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("trellis={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let json = logging.format.eq_ignore_ascii_case("json");

    match &logging.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            let writer = Arc::new(file);
            if json {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        None => {
            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            } else {
                registry.with(tracing_subscriber::fmt::layer()).init();
            }
        }
    }

    Ok(())
}
