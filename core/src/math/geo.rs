//! Flat-earth projection of (distance, bearing) pairs around the sensor origin.
//!
//! One degree of latitude is taken as a constant 111 km and the longitude
//! scale is corrected with the origin's latitude only. The result is good
//! enough to scatter devices on a map around the sensor, nothing more.

use crate::math::stats::StatsHelper;
use serde::{Deserialize, Serialize};

pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Distance assumed for observations that do not carry an estimate.
pub const DEFAULT_DISTANCE_M: f64 = 10.0;

/// Decimal places kept on projected coordinates.
pub const COORDINATE_DECIMALS: u32 = 6;

/// Fixed physical location of the sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Origin {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lng: 0.0,
            name: "Sensor".into(),
        }
    }
}

impl Origin {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }

    pub fn project(&self, distance_m: f64, bearing_deg: f64) -> GeoPoint {
        project(self, distance_m, bearing_deg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Offsets `origin` by `distance_m` along `bearing_deg` (0 = north, clockwise).
pub fn project(origin: &Origin, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    let distance_deg = distance_m / METERS_PER_DEGREE;
    let bearing = bearing_deg.to_radians();

    let lat = origin.lat + distance_deg * bearing.cos();
    let lng = origin.lng + distance_deg * bearing.sin() / origin.lat.to_radians().cos();

    GeoPoint {
        lat: StatsHelper::round_to(lat, COORDINATE_DECIMALS),
        lng: StatsHelper::round_to(lng, COORDINATE_DECIMALS),
    }
}
