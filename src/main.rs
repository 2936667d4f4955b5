use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use shard_merge::api;
use shard_merge::config::Config;
use shard_merge::services::MergeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(config.logging.style != "never")
        .init();

    info!("Starting server on {}", config.server_address());

    let merge_service = Arc::new(MergeService::new(&config.merge).map_err(|e| {
        error!("Invalid merge configuration: {}", e);
        e
    })?);

    info!(
        "Merging for {} by default, at most {} rows per merge",
        config.merge.default_database_type, config.merge.max_rows
    );

    // Create router with state
    let app: Router = api::routes::create_router_with_state(config.clone(), merge_service);

    // Start server
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_address()))?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
