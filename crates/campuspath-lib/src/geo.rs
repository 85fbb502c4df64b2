use serde::Serialize;

/// Mean Earth radius in meters used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 coordinates for a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Great-circle distance in meters to another point, via the haversine
    /// formula over a sphere of radius [`EARTH_RADIUS_M`].
    pub fn distance_to(&self, other: &Self) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let dphi = (other.latitude - self.latitude).to_radians();
        let dlambda = (other.longitude - self.longitude).to_radians();

        let a = (dphi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATHEDRAL: GeoPoint = GeoPoint {
        latitude: 40.4443,
        longitude: -79.9532,
    };
    const HILLMAN: GeoPoint = GeoPoint {
        latitude: 40.4425,
        longitude: -79.9538,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(CATHEDRAL.distance_to(&CATHEDRAL), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = CATHEDRAL.distance_to(&HILLMAN);
        let backward = HILLMAN.distance_to(&CATHEDRAL);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn nearby_buildings_are_hundreds_of_meters_apart() {
        // Roughly 200 m between these two points; haversine should land close.
        let distance = CATHEDRAL.distance_to(&HILLMAN);
        assert!(distance > 150.0 && distance < 300.0, "got {distance}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let south = GeoPoint {
            latitude: 40.0,
            longitude: -79.0,
        };
        let north = GeoPoint {
            latitude: 41.0,
            longitude: -79.0,
        };
        let distance = south.distance_to(&north);
        assert!((distance - 111_195.0).abs() < 100.0, "got {distance}");
    }
}
