use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the campuspath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Campus database could not be located at the resolved path.
    #[error("campus database not found at {path}")]
    DatabaseNotFound { path: PathBuf },

    /// Raised when the database lacks the expected `buildings` table.
    #[error("unsupported campus schema; expected a buildings table with a name column")]
    UnsupportedSchema,

    /// Raised for a malformed edge during graph construction. The loader
    /// recovers by skipping the row; the variant exists so single-edge
    /// validation failures stay distinguishable in diagnostics.
    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: i64,
        to: i64,
        reason: String,
    },

    /// Raised when a building reference could not be resolved in the registry.
    #[error("unknown building: {name}{}", format_suggestions(.suggestions))]
    UnknownBuilding {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when both endpoints exist but no walkable path connects them.
    #[error("no path found between {start} and {goal}")]
    NoPath { start: String, goal: String },

    /// Raised when a query arrives before any graph snapshot has been built.
    #[error("no graph snapshot has been built yet")]
    GraphUnavailable,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
