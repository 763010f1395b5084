//! Geographic primitives: coordinates, the serviced-region bounding box, and
//! great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed kilometre → mile conversion factor.
pub const MILES_PER_KM: f64 = 0.621_371_19;

/// A point in decimal degrees.
///
/// Used both for vendor positions and for the search reference point (the
/// default map center or a geocoded address).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite (not NaN, not infinite).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Rectangular latitude/longitude range of the serviced region.
///
/// Bounds are inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// San Francisco, the only serviced city.
    #[must_use]
    pub const fn san_francisco() -> Self {
        Self {
            min_lat: 37.6,
            max_lat: 37.9,
            min_lon: -123.1,
            max_lon: -122.3,
        }
    }

    /// Returns `true` when `point` is finite and falls inside the box.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        point.is_finite()
            && point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::san_francisco()
    }
}

/// Great-circle distance between two points in miles.
///
/// Haversine on a sphere of radius [`EARTH_RADIUS_KM`], converted with
/// [`MILES_PER_KM`]. Symmetric in its arguments and zero for identical points.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `h` a hair above 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c * MILES_PER_KM
}
