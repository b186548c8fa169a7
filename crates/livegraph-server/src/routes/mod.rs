//! HTTP route handlers, nested under `/api`.

pub mod dashboard;
pub mod graph;
pub mod stats;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use livegraph_core::LiveGraphConfig;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .merge(dashboard::routes())
        .nest("/api", api_routes());

    with_layers(routes, &state.config).with_state(state)
}

/// Body limit, request timeout, tracing and CORS, applied to every route.
fn with_layers(
    routes: Router<Arc<AppState>>,
    config: &LiveGraphConfig,
) -> Router<Arc<AppState>> {
    routes
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(graph::routes())
        .merge(stats::routes())
}
