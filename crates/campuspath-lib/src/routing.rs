//! Query façade translating external building references into engine calls.
//!
//! Resolution order: numeric references are treated as row identifiers,
//! anything else as a display name. The canonical identifier space is always
//! the registry rowid; names exist only at the boundary.

use std::fmt;

use serde::Serialize;

use crate::db::{BuildingId, Campus};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::graph::GraphSnapshot;
use crate::path::{shortest_path, PathFound};

/// External reference to a building: a numeric row identifier or a display
/// name.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingRef {
    Id(BuildingId),
    Name(String),
}

impl BuildingRef {
    /// Parse an external reference; all-digit strings resolve as row ids.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<BuildingId>() {
            Ok(id) => BuildingRef::Id(id),
            Err(_) => BuildingRef::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for BuildingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingRef::Id(id) => write!(f, "{id}"),
            BuildingRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for BuildingRef {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<BuildingId> for BuildingRef {
    fn from(id: BuildingId) -> Self {
        BuildingRef::Id(id)
    }
}

/// A route query between two external building references.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: BuildingRef,
    pub goal: BuildingRef,
}

impl RouteRequest {
    pub fn new(start: impl Into<BuildingRef>, goal: impl Into<BuildingRef>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
        }
    }
}

/// One rehydrated stop along a planned route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStop {
    pub id: BuildingId,
    pub name: String,
    pub position: Option<GeoPoint>,
    /// Distance from the previous stop; `None` on the first stop.
    pub leg_distance: Option<f64>,
}

/// Planned route returned by the library. Weights carry whatever unit the
/// loaded edges used (meters for the stock loaders); no conversion happens
/// here.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub start: BuildingId,
    pub goal: BuildingId,
    pub steps: Vec<RouteStop>,
    pub total_distance: f64,
    pub graph_version: u64,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Resolve an external reference to a registry identifier, enriching name
/// misses with fuzzy suggestions.
fn resolve_building(campus: &Campus, reference: &BuildingRef) -> Result<BuildingId> {
    match reference {
        BuildingRef::Id(id) if campus.contains(*id) => Ok(*id),
        BuildingRef::Id(id) => Err(Error::UnknownBuilding {
            name: id.to_string(),
            suggestions: Vec::new(),
        }),
        BuildingRef::Name(name) => {
            campus
                .building_id_by_name(name)
                .ok_or_else(|| Error::UnknownBuilding {
                    name: name.clone(),
                    suggestions: campus.fuzzy_building_matches(name, 3),
                })
        }
    }
}

/// Compute the shortest walk between two external references.
///
/// Fails with [`Error::UnknownBuilding`] when either reference is absent from
/// the registry and with [`Error::NoPath`] when both exist but sit in
/// disconnected components. Read-only: neither the registry nor the snapshot
/// is touched beyond lookups.
pub fn plan_route(
    campus: &Campus,
    graph: &GraphSnapshot,
    request: &RouteRequest,
) -> Result<RoutePlan> {
    let start_id = resolve_building(campus, &request.start)?;
    let goal_id = resolve_building(campus, &request.goal)?;

    let found = shortest_path(graph, start_id, goal_id).ok_or_else(|| Error::NoPath {
        start: request.start.to_string(),
        goal: request.goal.to_string(),
    })?;

    Ok(rehydrate(campus, graph, start_id, goal_id, found))
}

fn rehydrate(
    campus: &Campus,
    graph: &GraphSnapshot,
    start: BuildingId,
    goal: BuildingId,
    found: PathFound,
) -> RoutePlan {
    let mut steps = Vec::with_capacity(found.steps.len());
    let mut previous: Option<BuildingId> = None;
    for &id in &found.steps {
        let building = campus.buildings.get(&id);
        steps.push(RouteStop {
            id,
            name: building
                .map(|b| b.name.clone())
                .unwrap_or_default(),
            position: building.and_then(|b| b.position),
            leg_distance: previous.and_then(|prev| graph.edge_weight(prev, id)),
        });
        previous = Some(id);
    }

    RoutePlan {
        start,
        goal,
        steps,
        total_distance: found.total_distance,
        graph_version: graph.version(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_reference_as_id() {
        assert_eq!(BuildingRef::parse("42"), BuildingRef::Id(42));
        assert_eq!(BuildingRef::parse(" 7 "), BuildingRef::Id(7));
    }

    #[test]
    fn parse_text_reference_as_name() {
        assert_eq!(
            BuildingRef::parse("Hillman Library"),
            BuildingRef::Name("Hillman Library".to_string())
        );
    }

    #[test]
    fn display_round_trips_both_variants() {
        assert_eq!(BuildingRef::Id(3).to_string(), "3");
        assert_eq!(
            BuildingRef::Name("Posvar Hall".to_string()).to_string(),
            "Posvar Hall"
        );
    }

    #[test]
    fn route_plan_hop_count() {
        let plan = RoutePlan {
            start: 1,
            goal: 3,
            steps: vec![
                RouteStop {
                    id: 1,
                    name: "A".to_string(),
                    position: None,
                    leg_distance: None,
                },
                RouteStop {
                    id: 2,
                    name: "B".to_string(),
                    position: None,
                    leg_distance: Some(4.0),
                },
                RouteStop {
                    id: 3,
                    name: "C".to_string(),
                    position: None,
                    leg_distance: Some(6.0),
                },
            ],
            total_distance: 10.0,
            graph_version: 1,
        };
        assert_eq!(plan.hop_count(), 2);
    }
}
