//! Best-effort CSV ingestion for curated path edges.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::graph::EdgeRecord;

/// Summary of one CSV ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvReport {
    pub rows: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawEdgeRow {
    from_building_id: i64,
    to_building_id: i64,
    distance: f64,
}

/// Read `from_building_id,to_building_id,distance` rows from a CSV file.
///
/// Rows that fail to deserialize are skipped with a diagnostic and counted;
/// the rest of the file still loads. Only file-level errors (missing file,
/// unreadable header) abort the read.
pub fn read_edge_csv(path: &Path) -> Result<(Vec<EdgeRecord>, CsvReport)> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut edges = Vec::new();
    let mut report = CsvReport::default();
    for row in reader.deserialize::<RawEdgeRow>() {
        match row {
            Ok(raw) => {
                edges.push(EdgeRecord {
                    from: raw.from_building_id,
                    to: raw.to_building_id,
                    distance: raw.distance,
                });
                report.rows += 1;
            }
            Err(error) => {
                report.skipped += 1;
                warn!(%error, "skipping malformed csv row");
            }
        }
    }

    Ok((edges, report))
}
