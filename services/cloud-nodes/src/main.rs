//! Cloud Nodes Worker
//!
//! Serves cloud detection and tag-based pool member lookup over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cloud_nodes::routes::{router, AppState};
use cloud_nodes::{CloudDetector, Config, NodesWorker};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .json()
        .init();

    let config = Config::parse();

    let registry = config.provider_registry();
    if registry.is_empty() {
        warn!("No provider endpoints configured; node lookups will be rejected");
    }

    info!(
        listen_addr = %config.listen_addr,
        clouds = ?registry.clouds(),
        markers = config.markers().len(),
        "Starting Cloud Nodes Worker"
    );

    let detector = CloudDetector::new(config.markers());
    let nodes = NodesWorker::new(Arc::new(registry), config.provider_context());
    let app = router(AppState::new(detector, nodes));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
