//! campuspath library entry points.
//!
//! This crate exposes helpers to load the campus building registry from
//! SQLite, build immutable weighted-graph snapshots from curated or
//! coordinate-derived edges, and answer shortest-walk queries between
//! buildings. Higher-level consumers (CLI, HTTP service) should only depend
//! on the functions exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod db;
pub mod error;
pub mod geo;
pub mod graph;
pub mod import;
pub mod path;
pub mod routing;

pub use db::{
    append_paths, load_campus, load_curated_edges, replace_paths, Building, BuildingId, Campus,
};
pub use error::{Error, Result};
pub use geo::GeoPoint;
pub use graph::{
    build_graph, proximity_edges, EdgeRecord, GraphSnapshot, GraphStore, LoadReport,
    ProximityOptions,
};
pub use import::read_edge_csv;
pub use path::{shortest_path, PathFound};
pub use routing::{plan_route, BuildingRef, RoutePlan, RouteRequest, RouteStop};
