//! Live Graph server. Receives knowledge-graph pushes from the browser extension
//! and serves recent graphs and ingestion stats.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod activity;
mod error;
mod routes;
mod state;

use state::AppState;

fn print_usage() {
    println!("Live Graph - knowledge-graph ingestion server");
    println!();
    println!("Usage: livegraph [command]");
    println!();
    println!("Commands:");
    println!("  (none)    Start the server");
    println!("  help      Show this help message");
    println!();
    println!("Environment:");
    println!("  HOST, PORT                        Bind address (default 0.0.0.0:5000)");
    println!("  LIVEGRAPH_MAX_RETAINED            Graphs kept in memory (default: all)");
    println!("  LIVEGRAPH_MAX_BODY_BYTES          Largest accepted push (default 1048576)");
    println!("  LIVEGRAPH_REQUEST_TIMEOUT_SECS    Per-request timeout (default 30)");
    println!("  LIVEGRAPH_ACTIVITY_LOG            Activity log file, or 'off' (default graph_data.log)");
    println!("  RUST_LOG                          Log filter (default info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                print_usage();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'livegraph help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = livegraph_core::LiveGraphConfig::from_env()?;
    let addr = config.bind_addr();

    let state = Arc::new(AppState::new(config));
    match state.store.retention().limit() {
        Some(n) => info!("Retention: last {} graphs", n),
        None => info!("Retention: unbounded"),
    }
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Live graph server listening on {}", addr);
    info!("Graph push endpoint: http://{}/api/graph-data", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
