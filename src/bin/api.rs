//! Sawdesk API Server
//!
//! Run with: cargo run --bin sawdesk-api
//!
//! # Configuration
//!
//! Reads `--config <path>` when given, otherwise the first config file found
//! in the default locations (see `sawdesk::config::default_config_paths`).
//! Environment variables override file values:
//! - `SAWDESK_DB_PATH`: SQLite database path
//! - `SAWDESK_API_HOST` / `SAWDESK_API_PORT`: bind address (default: 0.0.0.0:8082)
//! - `SAWDESK_ENV`: `development` or `production`
//! - `SAWDESK_LOG_LEVEL` / `SAWDESK_LOG_FORMAT`: logging (`RUST_LOG` wins when set)

use anyhow::Context;
use clap::Parser;
use sawdesk::api::{serve, AppState};
use sawdesk::config::Config;
use sawdesk::store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sawdesk-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sharpening reports HTTP API")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, source) = match &args.config {
        Some(path) => (Config::load_with_env(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };

    config
        .logging
        .init_subscriber()
        .context("Failed to initialize logging")?;
    match &source {
        Some(path) => tracing::info!(path = ?path, "Loaded config"),
        None => tracing::info!("Using default config with environment overrides"),
    }

    tracing::info!("Starting Sawdesk API server v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.store.resolved_path();
    tracing::info!(path = ?db_path, "Opening record store");
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    let api_config = config.api.clone();
    serve(AppState::new(store, config), &api_config).await?;

    tracing::info!("Sawdesk API server stopped");
    Ok(())
}
