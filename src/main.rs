//! Turnkey - license-key authentication and per-service licensing

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnkey::{config::Args, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("turnkey={},info", args.log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Turnkey - licensing and auth API");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Store: {}", args.store_backend.as_str());
    info!("Request timeout: {}ms", args.request_timeout_ms);
    match args.action_daily_limit {
        Some(limit) => info!("Action daily limit: {}", limit),
        None => warn!("Action daily limit: unlimited"),
    }
    info!("======================================");

    let state = match AppState::connect(args).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize store: {}", e);
            std::process::exit(1);
        }
    };

    server::run(state).await?;

    Ok(())
}
