//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details
//! standard. See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use campuspath_lib::Error as LibError;

/// Problem type URI for unknown building references.
pub const PROBLEM_UNKNOWN_BUILDING: &str = "/problems/unknown-building";

/// Problem type URI for endpoints in disconnected components.
pub const PROBLEM_NO_PATH: &str = "/problems/no-path";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for queries arriving before the first graph build.
pub const PROBLEM_GRAPH_UNAVAILABLE: &str = "/problems/graph-unavailable";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (the request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Map a library error onto the problem taxonomy.
///
/// Unknown building and no-path stay distinguishable so clients can render
/// different messages for an unknown place versus an unreachable one.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownBuilding { .. } => ProblemDetails::new(
            PROBLEM_UNKNOWN_BUILDING,
            "Unknown Building",
            StatusCode::NOT_FOUND,
        )
        .with_detail(error.to_string())
        .with_request_id(request_id),

        LibError::NoPath { .. } => {
            ProblemDetails::new(PROBLEM_NO_PATH, "No Path Exists", StatusCode::NOT_FOUND)
                .with_detail(error.to_string())
                .with_request_id(request_id)
        }

        LibError::GraphUnavailable => ProblemDetails::new(
            PROBLEM_GRAPH_UNAVAILABLE,
            "Graph Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(error.to_string())
        .with_request_id(request_id),

        _ => ProblemDetails::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(error.to_string())
        .with_request_id(request_id),
    }
}
