//! HTTP routes for the detector and node lookup handlers

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::detector::{CloudDetector, Detection};
use crate::error::NodesError;
use crate::nodes::{Node, NodesWorker, RawNodesQuery};

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<CloudDetector>,
    pub nodes: Arc<NodesWorker>,
}

impl AppState {
    pub fn new(detector: CloudDetector, nodes: NodesWorker) -> Self {
        Self {
            detector: Arc::new(detector),
            nodes: Arc::new(nodes),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(&format!("/{}", CloudDetector::URI_PATH), get(detect_cloud))
        .route(&format!("/{}", NodesWorker::URI_PATH), get(get_nodes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cloud-nodes-worker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn detect_cloud(State(state): State<AppState>) -> Json<Detection> {
    Json(state.detector.detect().await)
}

async fn get_nodes(
    State(state): State<AppState>,
    Query(query): Query<RawNodesQuery>,
) -> Result<Json<Vec<Node>>, NodesError> {
    let nodes = state.nodes.handle(query).await?;
    Ok(Json(nodes))
}
