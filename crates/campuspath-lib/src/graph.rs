use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::db::{BuildingId, Campus};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;

/// Raw `(from, to, weight)` row fed to the edge loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: BuildingId,
    pub to: BuildingId,
    pub distance: f64,
}

/// Outcome counters for one load pass. Malformed rows are never fatal; they
/// surface here as an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Immutable adjacency structure built from one load cycle.
///
/// Symmetric by construction: every stored `(u, v, w)` entry has a matching
/// `(v, u, w)` entry, and the smallest weight per directed pair wins. Every
/// registry building gets an entry even when isolated, so a missing key means
/// the building was unknown at build time.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    version: u64,
    adjacency: HashMap<BuildingId, HashMap<BuildingId, f64>>,
}

impl GraphSnapshot {
    /// Monotonic version assigned by the [`GraphStore`] that built this
    /// snapshot (1 for snapshots built directly via [`build_graph`]).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the snapshot has an entry for this building.
    pub fn contains(&self, building: BuildingId) -> bool {
        self.adjacency.contains_key(&building)
    }

    /// Iterate the weighted neighbours of a building. Unknown buildings yield
    /// an empty iterator.
    pub fn neighbours(
        &self,
        building: BuildingId,
    ) -> impl Iterator<Item = (BuildingId, f64)> + '_ {
        self.adjacency
            .get(&building)
            .into_iter()
            .flatten()
            .map(|(&target, &weight)| (target, weight))
    }

    /// Weight of the edge `from -> to`, if present.
    pub fn edge_weight(&self, from: BuildingId, to: BuildingId) -> Option<f64> {
        self.adjacency.get(&from)?.get(&to).copied()
    }

    /// Number of buildings known to the snapshot.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges in the snapshot.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum::<usize>() / 2
    }
}

/// Validate a single edge row against the registry.
///
/// The loader recovers from failures by skipping the row; callers that want
/// hard validation of an individual edge can use this directly.
pub fn validate_edge(campus: &Campus, edge: &EdgeRecord) -> Result<()> {
    let reason = if !edge.distance.is_finite() {
        Some("weight is not finite")
    } else if edge.distance < 0.0 {
        Some("negative weight")
    } else if !campus.contains(edge.from) {
        Some("unknown origin building")
    } else if !campus.contains(edge.to) {
        Some("unknown destination building")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidEdge {
            from: edge.from,
            to: edge.to,
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Build an adjacency snapshot from edge rows.
///
/// Best-effort ingestion: rows rejected by [`validate_edge`] are skipped with
/// a diagnostic and counted in the report. Both traversal directions are
/// stored for every accepted row, keeping the smaller weight when a directed
/// pair repeats.
pub fn build_graph(
    campus: &Campus,
    edges: impl IntoIterator<Item = EdgeRecord>,
) -> (GraphSnapshot, LoadReport) {
    build_versioned(campus, edges, 1)
}

fn build_versioned(
    campus: &Campus,
    edges: impl IntoIterator<Item = EdgeRecord>,
    version: u64,
) -> (GraphSnapshot, LoadReport) {
    let mut adjacency: HashMap<BuildingId, HashMap<BuildingId, f64>> = HashMap::new();
    let mut report = LoadReport::default();

    for edge in edges {
        if let Err(error) = validate_edge(campus, &edge) {
            report.skipped += 1;
            warn!(%error, "skipping edge row");
            continue;
        }
        insert_min(&mut adjacency, edge.from, edge.to, edge.distance);
        insert_min(&mut adjacency, edge.to, edge.from, edge.distance);
        report.loaded += 1;
    }

    for &id in campus.buildings.keys() {
        adjacency.entry(id).or_default();
    }

    debug!(
        version,
        nodes = adjacency.len(),
        loaded = report.loaded,
        skipped = report.skipped,
        "graph snapshot built"
    );

    (GraphSnapshot { version, adjacency }, report)
}

fn insert_min(
    adjacency: &mut HashMap<BuildingId, HashMap<BuildingId, f64>>,
    from: BuildingId,
    to: BuildingId,
    distance: f64,
) {
    let entry = adjacency.entry(from).or_default().entry(to).or_insert(distance);
    if distance < *entry {
        *entry = distance;
    }
}

/// Options for coordinate-derived edge generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityOptions {
    /// Keep a pair only when either endpoint ranks the other among its `k`
    /// nearest neighbours. `None` connects every coordinate-bearing pair,
    /// which is quadratic in the number of buildings and fine at campus
    /// scale.
    pub max_neighbors: Option<usize>,
}

/// Generate bidirectional edges weighted by great-circle distance for every
/// pair of buildings that both carry coordinates. Buildings without
/// coordinates are excluded from this strategy only; curated edges may still
/// reference them.
pub fn proximity_edges(campus: &Campus, options: &ProximityOptions) -> Vec<EdgeRecord> {
    let positioned: Vec<(BuildingId, GeoPoint)> = campus
        .buildings
        .values()
        .filter_map(|building| building.position.map(|position| (building.id, position)))
        .collect();

    let mut pairs = Vec::new();
    for (i, &(from, from_position)) in positioned.iter().enumerate() {
        for &(to, to_position) in &positioned[i + 1..] {
            pairs.push(EdgeRecord {
                from,
                to,
                distance: from_position.distance_to(&to_position),
            });
        }
    }

    if let Some(cap) = options.max_neighbors {
        pairs = cap_neighbours(pairs, cap);
    }

    let mut edges = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        edges.push(pair);
        edges.push(EdgeRecord {
            from: pair.to,
            to: pair.from,
            distance: pair.distance,
        });
    }
    edges
}

/// Keep a pair when either endpoint counts the other among its `cap` nearest
/// neighbours. Taking the union rather than the intersection preserves the
/// symmetric-adjacency invariant.
fn cap_neighbours(pairs: Vec<EdgeRecord>, cap: usize) -> Vec<EdgeRecord> {
    let mut ranked: HashMap<BuildingId, Vec<(f64, BuildingId)>> = HashMap::new();
    for pair in &pairs {
        ranked
            .entry(pair.from)
            .or_default()
            .push((pair.distance, pair.to));
        ranked
            .entry(pair.to)
            .or_default()
            .push((pair.distance, pair.from));
    }

    let mut kept: HashSet<(BuildingId, BuildingId)> = HashSet::new();
    for (id, mut neighbours) in ranked {
        neighbours.sort_by(|a, b| compare_distance(a.0, b.0));
        for &(_, other) in neighbours.iter().take(cap) {
            kept.insert((id.min(other), id.max(other)));
        }
    }

    pairs
        .into_iter()
        .filter(|pair| kept.contains(&(pair.from.min(pair.to), pair.from.max(pair.to))))
        .collect()
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Greater)
}

/// Shared holder for the active graph snapshot.
///
/// Readers grab an `Arc` to the current snapshot and keep using it for the
/// whole query; rebuilds run serialized, construct the replacement off to the
/// side, and swap the reference once fully built. Readers never observe a
/// partially built structure.
#[derive(Debug)]
pub struct GraphStore {
    current: RwLock<Option<Arc<GraphSnapshot>>>,
    rebuild_guard: Mutex<()>,
    next_version: AtomicU64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            rebuild_guard: Mutex::new(()),
            next_version: AtomicU64::new(1),
        }
    }

    /// The current snapshot, or [`Error::GraphUnavailable`] before the first
    /// successful rebuild.
    pub fn snapshot(&self) -> Result<Arc<GraphSnapshot>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone().ok_or(Error::GraphUnavailable)
    }

    /// Whether a snapshot has been installed yet.
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Build a fresh snapshot from `edges` and install it.
    pub fn rebuild(
        &self,
        campus: &Campus,
        edges: impl IntoIterator<Item = EdgeRecord>,
    ) -> (Arc<GraphSnapshot>, LoadReport) {
        let _serialized = self
            .rebuild_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let version = self.next_version.fetch_add(1, AtomicOrdering::Relaxed);
        let (snapshot, report) = build_versioned(campus, edges, version);
        let snapshot = Arc::new(snapshot);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&snapshot));
        drop(guard);

        debug!(
            version = snapshot.version(),
            loaded = report.loaded,
            skipped = report.skipped,
            "graph snapshot installed"
        );

        (snapshot, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Building;

    fn campus(ids: &[BuildingId]) -> Campus {
        let mut buildings = HashMap::new();
        let mut name_to_id = HashMap::new();
        for &id in ids {
            let name = format!("Building {id}");
            buildings.insert(
                id,
                Building {
                    id,
                    name: name.clone(),
                    position: None,
                },
            );
            name_to_id.insert(name, id);
        }
        Campus {
            buildings,
            name_to_id,
        }
    }

    fn edge(from: BuildingId, to: BuildingId, distance: f64) -> EdgeRecord {
        EdgeRecord { from, to, distance }
    }

    #[test]
    fn build_stores_both_directions() {
        let campus = campus(&[1, 2]);
        let (graph, report) = build_graph(&campus, vec![edge(1, 2, 5.0)]);

        assert_eq!(report, LoadReport { loaded: 1, skipped: 0 });
        assert_eq!(graph.edge_weight(1, 2), Some(5.0));
        assert_eq!(graph.edge_weight(2, 1), Some(5.0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn duplicate_edges_keep_smallest_weight() {
        let campus = campus(&[1, 2]);
        let (graph, _) = build_graph(&campus, vec![edge(1, 2, 9.0), edge(1, 2, 4.0), edge(2, 1, 6.0)]);

        assert_eq!(graph.edge_weight(1, 2), Some(4.0));
        assert_eq!(graph.edge_weight(2, 1), Some(4.0));
    }

    #[test]
    fn invalid_rows_are_skipped_not_fatal() {
        let campus = campus(&[1, 2, 3]);
        let rows = vec![
            edge(1, 2, 5.0),
            edge(1, 2, -5.0),
            edge(1, 99, 2.0),
            edge(2, 3, f64::NAN),
            edge(2, 3, 7.0),
        ];
        let (graph, report) = build_graph(&campus, rows);

        assert_eq!(report, LoadReport { loaded: 2, skipped: 3 });
        assert_eq!(graph.edge_weight(1, 2), Some(5.0));
        assert_eq!(graph.edge_weight(2, 3), Some(7.0));
        assert_eq!(graph.edge_weight(1, 99), None);
    }

    #[test]
    fn isolated_buildings_still_appear_in_snapshot() {
        let campus = campus(&[1, 2, 3]);
        let (graph, _) = build_graph(&campus, vec![edge(1, 2, 1.0)]);

        assert!(graph.contains(3));
        assert_eq!(graph.neighbours(3).count(), 0);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn validate_edge_names_the_reason() {
        let campus = campus(&[1, 2]);
        let error = validate_edge(&campus, &edge(1, 2, -1.0)).unwrap_err();
        assert!(error.to_string().contains("negative weight"));
    }

    #[test]
    fn store_reports_unavailable_before_first_rebuild() {
        let store = GraphStore::new();
        assert!(!store.is_loaded());
        assert!(matches!(store.snapshot(), Err(Error::GraphUnavailable)));
    }

    #[test]
    fn store_swaps_snapshots_and_bumps_versions() {
        let campus = campus(&[1, 2]);
        let store = GraphStore::new();

        let (first, _) = store.rebuild(&campus, vec![edge(1, 2, 5.0)]);
        assert_eq!(first.version(), 1);

        // Readers holding the old snapshot keep seeing it after a rebuild.
        let held = store.snapshot().unwrap();
        let (second, _) = store.rebuild(&campus, vec![edge(1, 2, 3.0)]);
        assert_eq!(second.version(), 2);
        assert_eq!(held.version(), 1);
        assert_eq!(held.edge_weight(1, 2), Some(5.0));
        assert_eq!(store.snapshot().unwrap().edge_weight(1, 2), Some(3.0));
    }

    fn positioned_campus(points: &[(BuildingId, f64, f64)]) -> Campus {
        let mut buildings = HashMap::new();
        let mut name_to_id = HashMap::new();
        for &(id, latitude, longitude) in points {
            let name = format!("Building {id}");
            buildings.insert(
                id,
                Building {
                    id,
                    name: name.clone(),
                    position: Some(GeoPoint {
                        latitude,
                        longitude,
                    }),
                },
            );
            name_to_id.insert(name, id);
        }
        Campus {
            buildings,
            name_to_id,
        }
    }

    #[test]
    fn proximity_connects_all_positioned_pairs() {
        let mut campus = positioned_campus(&[(1, 40.0, -79.0), (2, 40.001, -79.0), (3, 40.002, -79.0)]);
        // A building without coordinates is excluded from this strategy only.
        campus.buildings.insert(
            4,
            Building {
                id: 4,
                name: "Annex".to_string(),
                position: None,
            },
        );
        campus.name_to_id.insert("Annex".to_string(), 4);

        let edges = proximity_edges(&campus, &ProximityOptions::default());

        // Three pairs, both directions each.
        assert_eq!(edges.len(), 6);
        assert!(edges.iter().all(|e| e.from != 4 && e.to != 4));
        assert!(edges.iter().all(|e| e.distance > 0.0));
    }

    #[test]
    fn proximity_cap_keeps_union_of_nearest() {
        // Four buildings on a line; with cap 1 each keeps only its nearest,
        // but the union keeps the chain connected pairwise.
        let campus = positioned_campus(&[
            (1, 40.000, -79.0),
            (2, 40.001, -79.0),
            (3, 40.003, -79.0),
            (4, 40.006, -79.0),
        ]);

        let edges = proximity_edges(
            &campus,
            &ProximityOptions {
                max_neighbors: Some(1),
            },
        );

        let mut pairs: Vec<(BuildingId, BuildingId)> = edges
            .iter()
            .map(|e| (e.from.min(e.to), e.from.max(e.to)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        // 1-2 (mutual nearest), 2-3 (3's nearest), 3-4 (4's nearest).
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn proximity_capped_graph_stays_symmetric() {
        let campus = positioned_campus(&[
            (1, 40.000, -79.0),
            (2, 40.001, -79.0),
            (3, 40.003, -79.0),
        ]);
        let edges = proximity_edges(
            &campus,
            &ProximityOptions {
                max_neighbors: Some(1),
            },
        );
        let (graph, _) = build_graph(&campus, edges);

        for id in [1, 2, 3] {
            for (neighbour, weight) in graph.neighbours(id) {
                assert_eq!(graph.edge_weight(neighbour, id), Some(weight));
            }
        }
    }
}
