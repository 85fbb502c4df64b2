//! Service entry point.
//!
//! # Configuration
//!
//! - `CAMPUSPATH_DB` - Path to the campus SQLite database (default: campus.db)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - json (default) or text

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use campuspath_service::{init_logging, router, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env();
    init_logging(&logging_config);

    let db_path = env::var("CAMPUSPATH_DB").unwrap_or_else(|_| "campus.db".to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(db_path = %db_path, port = port, "starting route service");

    let state = AppState::load(&db_path).map_err(|e| {
        error!(error = %e, path = %db_path, "failed to load application state");
        e
    })?;

    info!(
        buildings = state.campus().buildings.len(),
        graph_loaded = state.is_graph_loaded(),
        "application state loaded"
    );

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
