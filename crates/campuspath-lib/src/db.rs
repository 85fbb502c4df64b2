use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::graph::EdgeRecord;

/// Numeric identifier for a building (the SQLite rowid).
pub type BuildingId = i64;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Representation of a campus building with optional coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub position: Option<GeoPoint>,
}

/// In-memory registry of campus buildings.
///
/// The registry owns all display attributes; routing code treats buildings
/// purely as opaque identifiers and consults the registry only to resolve
/// external references and rehydrate results.
#[derive(Debug, Clone, Default)]
pub struct Campus {
    pub buildings: HashMap<BuildingId, Building>,
    pub name_to_id: HashMap<String, BuildingId>,
}

impl Campus {
    /// Lookup a building identifier by its case-sensitive name.
    pub fn building_id_by_name(&self, name: &str) -> Option<BuildingId> {
        self.name_to_id.get(name).copied()
    }

    /// Lookup a building name by identifier.
    pub fn building_name(&self, id: BuildingId) -> Option<&str> {
        self.buildings.get(&id).map(|building| building.name.as_str())
    }

    /// Whether the registry knows this identifier.
    pub fn contains(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(&id)
    }

    /// Return up to `limit` building names similar to `name`, best match
    /// first. Used to enrich unknown-building errors.
    pub fn fuzzy_building_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .buildings
            .values()
            .map(|building| {
                let score = strsim::jaro_winkler(&needle, &building.name.to_lowercase());
                (score, building.name.as_str())
            })
            .filter(|(score, _)| *score >= FUZZY_MATCH_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored.into_iter().map(|(_, name)| name.to_string()).collect()
    }
}

/// Load the building registry from a campus database.
///
/// Expects a `buildings` table whose rowid serves as the canonical building
/// identifier. Coordinates are read from `latitude`/`longitude` columns when
/// present; rows without a name are skipped with a diagnostic rather than
/// failing the load.
pub fn load_campus(db_path: &Path) -> Result<Campus> {
    if !db_path.exists() {
        return Err(Error::DatabaseNotFound {
            path: db_path.to_path_buf(),
        });
    }
    let connection = Connection::open(db_path)?;

    if !table_exists(&connection, "buildings")? {
        return Err(Error::UnsupportedSchema);
    }
    let has_coordinates = table_has_columns(&connection, "buildings", &["latitude", "longitude"])?;
    let sql = if has_coordinates {
        "SELECT rowid AS id, name, latitude, longitude FROM buildings"
    } else {
        "SELECT rowid AS id, name, NULL, NULL FROM buildings"
    };

    let mut stmt = connection.prepare(sql)?;
    let mut rows = stmt.query([])?;

    let mut buildings = HashMap::new();
    let mut skipped_rows = 0usize;
    while let Some(row) = rows.next()? {
        let id: BuildingId = row.get(0)?;
        let Some(name) = row.get::<_, Option<String>>(1)? else {
            skipped_rows += 1;
            continue;
        };
        let latitude = value_to_f64(row.get_ref(2)?);
        let longitude = value_to_f64(row.get_ref(3)?);
        let position = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };
        buildings.insert(id, Building { id, name, position });
    }

    if skipped_rows > 0 {
        warn!(skipped_rows, "ignored building rows with no name");
    }

    let name_to_id = buildings
        .values()
        .map(|building| (building.name.clone(), building.id))
        .collect();

    debug!(
        buildings = buildings.len(),
        path = %db_path.display(),
        "campus registry loaded"
    );

    Ok(Campus {
        buildings,
        name_to_id,
    })
}

/// Load curated edge rows from the `paths` table.
///
/// Rows that fail to coerce to `(i64, i64, f64)` are skipped and counted.
/// A missing `paths` table yields an empty edge list so callers relying on
/// coordinate-derived edges still work.
pub fn load_curated_edges(db_path: &Path) -> Result<Vec<EdgeRecord>> {
    if !db_path.exists() {
        return Err(Error::DatabaseNotFound {
            path: db_path.to_path_buf(),
        });
    }
    let connection = Connection::open(db_path)?;

    if !table_exists(&connection, "paths")? {
        warn!(path = %db_path.display(), "paths table missing; no curated edges loaded");
        return Ok(Vec::new());
    }

    let mut stmt =
        connection.prepare("SELECT from_building_id, to_building_id, distance FROM paths")?;
    let mut rows = stmt.query([])?;

    let mut edges = Vec::new();
    let mut skipped_rows = 0usize;
    while let Some(row) = rows.next()? {
        let from = value_to_i64(row.get_ref(0)?);
        let to = value_to_i64(row.get_ref(1)?);
        let distance = value_to_f64(row.get_ref(2)?);
        match (from, to, distance) {
            (Some(from), Some(to), Some(distance)) => {
                edges.push(EdgeRecord { from, to, distance });
            }
            _ => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        warn!(skipped_rows, "ignored unparseable path rows");
    }

    Ok(edges)
}

/// Append edge rows to the `paths` table, creating it when absent.
pub fn append_paths(db_path: &Path, edges: &[EdgeRecord]) -> Result<usize> {
    let mut connection = Connection::open(db_path)?;
    create_paths_table(&connection)?;
    let tx = connection.transaction()?;
    insert_paths(&tx, edges)?;
    tx.commit()?;
    Ok(edges.len())
}

/// Replace the full contents of the `paths` table with `edges`.
pub fn replace_paths(db_path: &Path, edges: &[EdgeRecord]) -> Result<usize> {
    let mut connection = Connection::open(db_path)?;
    create_paths_table(&connection)?;
    let tx = connection.transaction()?;
    tx.execute("DELETE FROM paths", [])?;
    insert_paths(&tx, edges)?;
    tx.commit()?;
    Ok(edges.len())
}

fn create_paths_table(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS paths (
            from_building_id INTEGER NOT NULL,
            to_building_id INTEGER NOT NULL,
            distance REAL NOT NULL
        )",
    )?;
    Ok(())
}

fn insert_paths(tx: &Transaction<'_>, edges: &[EdgeRecord]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO paths (from_building_id, to_building_id, distance) VALUES (?1, ?2, ?3)",
    )?;
    for edge in edges {
        stmt.execute(params![edge.from, edge.to, edge.distance])?;
    }
    Ok(())
}

fn value_to_f64(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Real(v) => Some(v),
        ValueRef::Integer(v) => Some(v as f64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_i64(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(v) => Some(v),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
        _ => None,
    }
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
