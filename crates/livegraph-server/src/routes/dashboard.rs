//! Landing page. The live force-graph view is an external consumer of the
//! JSON routes; this page only points at them.

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Live Graph Server</title>
</head>
<body>
<h1>Live Graph Server</h1>
<p>Configure the extension's Graph Push API URL as <code>/api/graph-data</code> on this host.</p>
<ul>
<li><a href="/api/stats">/api/stats</a></li>
<li><a href="/api/graphs?limit=10">/api/graphs?limit=10</a></li>
<li><a href="/api/health">/api/health</a></li>
</ul>
</body>
</html>
"#;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
