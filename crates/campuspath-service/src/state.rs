//! Application state for the route service.
//!
//! Holds the building registry and the shared graph snapshot store. The
//! registry is fixed at startup; the snapshot is rebuilt on demand via the
//! rebuild endpoint and swapped atomically, so in-flight queries keep the
//! snapshot they started with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use campuspath_lib::{
    load_campus, load_curated_edges, Campus, GraphSnapshot, GraphStore, LoadReport,
    Result as LibResult,
};

/// Shared application state for all axum handlers. Cheaply cloneable; share
/// via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    campus: Campus,
    store: GraphStore,
    db_path: PathBuf,
}

impl AppState {
    /// Load the registry from `db_path` and build the initial graph snapshot
    /// from the curated `paths` table.
    pub fn load(db_path: impl AsRef<Path>) -> LibResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        tracing::info!(path = %db_path.display(), "loading campus registry");
        let campus = load_campus(&db_path)?;

        let store = GraphStore::new();
        let edges = load_curated_edges(&db_path)?;
        let (snapshot, report) = store.rebuild(&campus, edges);
        tracing::info!(
            buildings = campus.buildings.len(),
            edges = snapshot.edge_count(),
            skipped = report.skipped,
            version = snapshot.version(),
            "initial graph snapshot built"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                campus,
                store,
                db_path,
            }),
        })
    }

    /// Assemble state from pre-loaded components. Useful for tests that need
    /// a store in a particular condition (for example, no snapshot yet).
    pub fn from_parts(campus: Campus, store: GraphStore, db_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                campus,
                store,
                db_path: db_path.into(),
            }),
        }
    }

    /// Access the building registry.
    pub fn campus(&self) -> &Campus {
        &self.inner.campus
    }

    /// The current graph snapshot, if one has been built.
    pub fn snapshot(&self) -> LibResult<Arc<GraphSnapshot>> {
        self.inner.store.snapshot()
    }

    /// Whether a snapshot is installed.
    pub fn is_graph_loaded(&self) -> bool {
        self.inner.store.is_loaded()
    }

    /// Re-read the curated edges from the database and swap in a fresh
    /// snapshot. Rebuilds are serialized by the store.
    pub fn rebuild(&self) -> LibResult<(Arc<GraphSnapshot>, LoadReport)> {
        let edges = load_curated_edges(&self.inner.db_path)?;
        Ok(self.inner.store.rebuild(&self.inner.campus, edges))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("building_count", &self.inner.campus.buildings.len())
            .field("graph_loaded", &self.inner.store.is_loaded())
            .finish()
    }
}
