//! Stats and health routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use livegraph_store::format_uptime;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/health", get(health_check))
}

/// GET /api/stats: ingestion counters.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (snap, retained) = state.store.read_with(|len| (state.stats.snapshot(), len));

    Json(serde_json::json!({
        "total_received": snap.total_received,
        "unique_videos": snap.unique_videos,
        "server_uptime": format_uptime(state.stats.uptime()),
        "start_time": snap.start_time.to_rfc3339(),
        "latest_graphs": retained,
    }))
}

/// GET /api/health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": format_uptime(state.stats.uptime()),
    }))
}
