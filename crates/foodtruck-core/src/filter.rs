//! Text and radius filters and the result ordering shared by every search.
//!
//! The two filters combine with a permissive OR: a vendor qualifies if it
//! matches the text *or* lies within the radius. Do not tighten this to AND.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geo::{distance_miles, Coordinate};
use crate::vendor::Vendor;

/// Allowed search radius range and its default, in miles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusLimits {
    pub min_miles: f64,
    pub max_miles: f64,
    pub default_miles: f64,
}

impl RadiusLimits {
    /// Clamps `miles` into range; non-finite input falls back to the default.
    #[must_use]
    pub fn clamp(&self, miles: f64) -> f64 {
        if miles.is_finite() {
            miles.clamp(self.min_miles, self.max_miles)
        } else {
            self.default_miles
        }
    }
}

impl Default for RadiusLimits {
    fn default() -> Self {
        Self {
            min_miles: 1.0,
            max_miles: 10.0,
            default_miles: 5.0,
        }
    }
}

/// The user's current search input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub radius_miles: f64,
}

impl SearchQuery {
    #[must_use]
    pub fn new(limits: &RadiusLimits) -> Self {
        Self {
            text: String::new(),
            radius_miles: limits.default_miles,
        }
    }

    /// Query text trimmed and lowercased, ready for [`text_matches`].
    #[must_use]
    pub fn needle(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

/// Case-insensitive substring match over name, category, facility type and
/// status. `needle` must already be lowercase; an empty needle matches all.
#[must_use]
pub fn text_matches(vendor: &Vendor, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        Some(vendor.name.as_str()),
        Some(vendor.category.as_str()),
        vendor.facility_type.as_deref(),
        vendor.status.as_deref(),
    ]
    .into_iter()
    .any(|field| field.unwrap_or_default().to_lowercase().contains(needle))
}

/// Distance constraint around a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFilter {
    pub origin: Coordinate,
    pub radius_miles: f64,
}

impl RadiusFilter {
    /// Returns a copy of `vendor` carrying its distance from the origin, and
    /// whether that distance is within the radius.
    #[must_use]
    pub fn measure(&self, vendor: &Vendor) -> (Vendor, bool) {
        let distance = distance_miles(self.origin, vendor.coordinate());
        (vendor.with_distance(distance), distance <= self.radius_miles)
    }
}

/// Runs the text filter, and the radius filter when one is given, over
/// `vendors` and returns the ordered result.
///
/// With a radius filter every returned vendor carries its distance, and a
/// vendor is kept if it matches the text or lies within the radius. An empty
/// needle takes no part in that OR, so the radius alone decides.
#[must_use]
pub fn apply_filters(vendors: &[Vendor], needle: &str, radius: Option<&RadiusFilter>) -> Vec<Vendor> {
    let mut results: Vec<Vendor> = match radius {
        Some(filter) => vendors
            .iter()
            .filter_map(|vendor| {
                let (measured, within) = filter.measure(vendor);
                let text_hit = !needle.is_empty() && text_matches(vendor, needle);
                (within || text_hit).then_some(measured)
            })
            .collect(),
        None => vendors
            .iter()
            .filter(|vendor| text_matches(vendor, needle))
            .cloned()
            .collect(),
    };
    sort_by_distance(&mut results);
    results
}

/// Stable ascending sort by distance; vendors without one go last, and equal
/// keys keep their input order.
pub fn sort_by_distance(vendors: &mut [Vendor]) {
    vendors.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
