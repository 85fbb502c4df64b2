//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Number of buildings loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings_loaded: Option<usize>,

    /// Installed graph snapshot version (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_version: Option<u64>,
}

impl HealthStatus {
    fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            buildings_loaded: None,
            graph_version: None,
        }
    }

    fn ready(service: &str, version: &str, buildings: usize, graph_version: u64) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            buildings_loaded: Some(buildings),
            graph_version: Some(graph_version),
        }
    }

    fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            buildings_loaded: None,
            graph_version: None,
        }
    }
}

/// Liveness probe handler. Succeeds whenever the process is running.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Requires a loaded registry and an installed
/// graph snapshot.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let building_count = state.campus().buildings.len();
    if building_count == 0 {
        let status = HealthStatus::not_ready(service, version, "no buildings loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    match state.snapshot() {
        Ok(snapshot) => {
            let status = HealthStatus::ready(service, version, building_count, snapshot.version());
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(_) => {
            let status = HealthStatus::not_ready(service, version, "graph not built");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
