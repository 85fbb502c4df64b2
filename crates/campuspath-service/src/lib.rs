//! Campus route planning HTTP microservice.
//!
//! # Endpoints
//!
//! - `GET /api/v1/route?start=..&end=..` - Shortest walk between two buildings
//! - `GET /api/v1/buildings` - Building listing
//! - `POST /api/v1/graph/rebuild` - Rebuild the graph snapshot from the database
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod health;
pub mod logging;
pub mod problem;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{from_lib_error, ProblemDetails};
pub use state::AppState;

/// Assemble the service router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/route", get(routes::route_handler))
        .route("/api/v1/buildings", get(routes::buildings_handler))
        .route("/api/v1/graph/rebuild", post(routes::rebuild_handler))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
