//! Route, building, and rebuild handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use campuspath_lib::{plan_route, Building, BuildingRef, RoutePlan, RouteRequest, RouteStop};

use crate::problem::{from_lib_error, ProblemDetails};
use crate::state::AppState;

/// Query parameters accepted by the route endpoint. Each endpoint reference
/// is a building rowid or an exact display name.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Route response returned to the caller. Distances are meters, preserved
/// end-to-end from the loaded edges without conversion.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Total walking distance in meters.
    pub total_distance_m: f64,
    /// Number of hops in the route.
    pub hops: usize,
    /// Version of the snapshot that answered the query.
    pub graph_version: u64,
    /// Ordered stops from start to goal, inclusive.
    pub route: Vec<RouteStop>,
}

impl RouteResponse {
    fn from_plan(plan: RoutePlan) -> Self {
        Self {
            total_distance_m: plan.total_distance,
            hops: plan.hop_count(),
            graph_version: plan.graph_version,
            route: plan.steps,
        }
    }
}

/// Handle `GET /api/v1/route?start=..&end=..`.
pub async fn route_handler(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let request_id = generate_request_id();

    let (start, end) = match (query.start.as_deref(), query.end.as_deref()) {
        (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
            (start, end)
        }
        _ => {
            return ProblemDetails::bad_request(
                "provide non-empty `start` and `end` query parameters (building rowid or name)",
                &request_id,
            )
            .into_response();
        }
    };

    info!(request_id = %request_id, start, end, "handling route request");

    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(error) => {
            warn!(request_id = %request_id, %error, "no graph snapshot available");
            return from_lib_error(&error, &request_id).into_response();
        }
    };

    let request = RouteRequest::new(BuildingRef::parse(start), BuildingRef::parse(end));
    match plan_route(state.campus(), &snapshot, &request) {
        Ok(plan) => {
            info!(
                request_id = %request_id,
                hops = plan.hop_count(),
                total_distance_m = plan.total_distance,
                "route computed"
            );
            (StatusCode::OK, Json(RouteResponse::from_plan(plan))).into_response()
        }
        Err(error) => {
            warn!(request_id = %request_id, %error, "route planning failed");
            from_lib_error(&error, &request_id).into_response()
        }
    }
}

/// Handle `GET /api/v1/buildings`.
pub async fn buildings_handler(State(state): State<AppState>) -> Response {
    let mut buildings: Vec<Building> = state.campus().buildings.values().cloned().collect();
    buildings.sort_by_key(|building| building.id);
    (StatusCode::OK, Json(buildings)).into_response()
}

/// Summary returned after a graph rebuild.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub version: u64,
    pub nodes: usize,
    pub edges: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Handle `POST /api/v1/graph/rebuild`: re-read the curated edges and swap in
/// a fresh snapshot. In-flight queries keep the snapshot they started with.
pub async fn rebuild_handler(State(state): State<AppState>) -> Response {
    let request_id = generate_request_id();

    match state.rebuild() {
        Ok((snapshot, report)) => {
            info!(
                request_id = %request_id,
                version = snapshot.version(),
                loaded = report.loaded,
                skipped = report.skipped,
                "graph rebuilt"
            );
            (
                StatusCode::OK,
                Json(RebuildResponse {
                    version: snapshot.version(),
                    nodes: snapshot.node_count(),
                    edges: snapshot.edge_count(),
                    loaded: report.loaded,
                    skipped: report.skipped,
                }),
            )
                .into_response()
        }
        Err(error) => {
            warn!(request_id = %request_id, %error, "graph rebuild failed");
            from_lib_error(&error, &request_id).into_response()
        }
    }
}

/// Generate a unique request ID for tracing.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    format!("req-{:x}", timestamp)
}
