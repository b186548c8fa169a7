//! Graph ingestion and recent-graph routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use livegraph_core::Error;
use livegraph_ingest::Ingester;
use livegraph_store::GraphRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Graphs returned by `/graphs` when no limit is given.
const DEFAULT_GRAPH_LIMIT: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/graph-data", post(receive_graph_data))
        .route("/graphs", get(get_graphs))
}

#[derive(Debug, Serialize)]
struct IngestAck {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
    graph_id: u64,
}

#[derive(Debug, Deserialize)]
struct GraphsQuery {
    limit: Option<String>,
}

/// POST /api/graph-data: accept one push from the browser extension.
async fn receive_graph_data(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<IngestAck>, ApiError> {
    let record = Ingester::new(&state.store, &state.stats).ingest_bytes(&body)?;

    if let Some(activity) = &state.activity {
        if let Err(e) = activity.record(&record) {
            warn!(
                "Cannot append graph {} to activity log {}: {}",
                record.graph_id,
                activity.path().display(),
                e
            );
        }
    }

    Ok(Json(IngestAck {
        success: true,
        message: "Graph data received successfully",
        timestamp: record.timestamp,
        graph_id: record.graph_id,
    }))
}

/// GET /api/graphs?limit=N: the N most recent graphs, oldest first.
async fn get_graphs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let records = state.store.recent(limit);
    let graphs: Vec<&GraphRecord> = records.iter().map(|r| r.as_ref()).collect();

    Ok(Json(serde_json::json!({
        "graphs": graphs,
        "total": state.store.len(),
    })))
}

fn parse_limit(raw: Option<&str>) -> livegraph_core::Result<usize> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_GRAPH_LIMIT),
        Some(s) => s.parse().map_err(|_| {
            Error::MalformedQuery(format!("limit must be a non-negative integer, got {:?}", s))
        }),
    }
}
