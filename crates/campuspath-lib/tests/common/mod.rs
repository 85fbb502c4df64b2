// Shared fixture helpers for campuspath-lib integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use campuspath_lib::{Building, BuildingId, Campus, GeoPoint};

/// Campus with anonymous buildings for the given identifiers.
pub fn campus(ids: &[BuildingId]) -> Campus {
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

/// Campus with explicitly named buildings.
pub fn named_campus(entries: &[(BuildingId, &str)]) -> Campus {
    let mut buildings = HashMap::new();
    let mut name_to_id = HashMap::new();
    for &(id, name) in entries {
        buildings.insert(
            id,
            Building {
                id,
                name: name.to_string(),
                position: None,
            },
        );
        name_to_id.insert(name.to_string(), id);
    }
    Campus {
        buildings,
        name_to_id,
    }
}

/// Campus whose buildings carry coordinates.
pub fn positioned_campus(entries: &[(BuildingId, &str, f64, f64)]) -> Campus {
    let mut buildings = HashMap::new();
    let mut name_to_id = HashMap::new();
    for &(id, name, latitude, longitude) in entries {
        buildings.insert(
            id,
            Building {
                id,
                name: name.to_string(),
                position: Some(GeoPoint {
                    latitude,
                    longitude,
                }),
            },
        );
        name_to_id.insert(name.to_string(), id);
    }
    Campus {
        buildings,
        name_to_id,
    }
}
