//! Position resolution and the proximity geofence.
//!
//! Distances are nautical miles on a spherical Earth, altitudes are feet.

use serde::{Deserialize, Serialize};

use crate::feed::{Altitude, ObjectSnapshot};

/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Resolve a usable position from either encoding the feed uses.
///
/// The live `lat`/`lon` pair wins; if either component is missing or exactly
/// zero the nested `lastPosition` pair is tried under the same rule. `None`
/// means no fix.
///
/// A genuine report at 0° latitude or 0° longitude is indistinguishable from
/// "missing" under this rule. That is acceptable for a receiver far from the
/// equator and prime meridian, and is left as-is rather than guessed at.
pub fn resolve_position(snapshot: &ObjectSnapshot) -> Option<Coordinates> {
    let primary = (
        snapshot.lat.unwrap_or(0.0),
        snapshot.lon.unwrap_or(0.0),
    );
    if let Some(coords) = non_zero_pair(primary) {
        return Some(coords);
    }

    snapshot
        .last_position
        .and_then(|last| non_zero_pair((last.lat, last.lon)))
}

fn non_zero_pair((lat, lon): (f64, f64)) -> Option<Coordinates> {
    if lat == 0.0 || lon == 0.0 {
        None
    } else {
        Some(Coordinates::new(lat, lon))
    }
}

/// Great-circle distance between two points, in nautical miles.
pub fn haversine_nm(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against a > 1.0 from rounding near antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    c * EARTH_RADIUS_NM
}

/// Receiver location the geofence is centred on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomeConfig {
    pub lat: f64,
    pub lon: f64,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            lat: 35.740971,
            lon: -78.498878,
        }
    }
}

/// Proximity alert zone settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityConfig {
    #[serde(default = "default_radius_nm")]
    pub radius_nm: f64,
    #[serde(default = "default_ceiling_ft")]
    pub ceiling_ft: f64,
}

fn default_radius_nm() -> f64 {
    5.0
}

fn default_ceiling_ft() -> f64 {
    2000.0
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_nm: default_radius_nm(),
            ceiling_ft: default_ceiling_ft(),
        }
    }
}

/// Radius- and altitude-bounded zone around the home point.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    pub home: Coordinates,
    pub radius_nm: f64,
    pub ceiling_ft: f64,
}

impl Geofence {
    pub fn new(home: HomeConfig, proximity: ProximityConfig) -> Self {
        Self {
            home: Coordinates::new(home.lat, home.lon),
            radius_nm: proximity.radius_nm,
            ceiling_ft: proximity.ceiling_ft,
        }
    }

    pub fn distance_from_home(&self, position: Coordinates) -> f64 {
        haversine_nm(self.home, position)
    }

    /// Inside the radius and airborne below the ceiling: `(0, ceiling]` feet.
    /// Ground and unknown altitudes never qualify.
    pub fn contains(&self, distance_nm: f64, altitude: Altitude) -> bool {
        if distance_nm > self.radius_nm {
            return false;
        }
        match altitude {
            Altitude::Numeric(feet) => feet > 0.0 && feet <= self.ceiling_ft,
            Altitude::Ground | Altitude::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::LastPosition;

    fn fence() -> Geofence {
        Geofence::new(HomeConfig::default(), ProximityConfig::default())
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = Coordinates::new(35.74, -78.49);
        assert!(haversine_nm(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // One degree of latitude is ~60 nm.
        let d = haversine_nm(Coordinates::new(35.0, -78.0), Coordinates::new(36.0, -78.0));
        assert!((d - 60.04).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_haversine_antipodal_is_finite() {
        let d = haversine_nm(Coordinates::new(90.0, 0.0), Coordinates::new(-90.0, 0.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_NM).abs() < 1e-3);
    }

    #[test]
    fn test_contains_altitude_band() {
        let f = fence();
        assert!(f.contains(1.0, Altitude::Numeric(1500.0)));
        assert!(f.contains(1.0, Altitude::Numeric(2000.0)));
        assert!(!f.contains(1.0, Altitude::Numeric(2001.0)));
        assert!(!f.contains(1.0, Altitude::Numeric(0.0)));
        assert!(!f.contains(1.0, Altitude::Ground));
        assert!(!f.contains(1.0, Altitude::Unknown));
        assert!(!f.contains(5.1, Altitude::Numeric(1500.0)));
    }

    #[test]
    fn test_resolve_prefers_primary() {
        let snap = ObjectSnapshot {
            lat: Some(35.7),
            lon: Some(-78.5),
            last_position: Some(LastPosition { lat: 36.0, lon: -79.0 }),
            ..Default::default()
        };
        assert_eq!(resolve_position(&snap), Some(Coordinates::new(35.7, -78.5)));
    }

    #[test]
    fn test_resolve_falls_back_to_last_position() {
        let snap = ObjectSnapshot {
            lat: Some(0.0),
            lon: Some(0.0),
            last_position: Some(LastPosition { lat: 36.0, lon: -79.0 }),
            ..Default::default()
        };
        assert_eq!(resolve_position(&snap), Some(Coordinates::new(36.0, -79.0)));
    }

    #[test]
    fn test_resolve_single_zero_component_is_absent() {
        let snap = ObjectSnapshot {
            lat: Some(35.7),
            lon: Some(0.0),
            ..Default::default()
        };
        assert_eq!(resolve_position(&snap), None);
    }

    #[test]
    fn test_resolve_no_fix() {
        let snap = ObjectSnapshot {
            lat: Some(0.0),
            lon: Some(0.0),
            last_position: Some(LastPosition { lat: 0.0, lon: 0.0 }),
            ..Default::default()
        };
        assert_eq!(resolve_position(&snap), None);
        assert_eq!(resolve_position(&ObjectSnapshot::default()), None);
    }
}
