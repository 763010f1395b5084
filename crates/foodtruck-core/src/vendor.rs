//! Vendor records: the raw provider shape, the validated domain type, and the
//! coordinate validator that sits between them.

use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, Coordinate};

/// One vendor record exactly as the data provider returned it.
///
/// Provider fields arrive as strings *or* numbers depending on the export
/// (`"37.78"` vs `37.78`, `"1565548"` vs `1565548`), so the record keeps the
/// raw JSON object and exposes typed accessors instead of a rigid struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawVendorRecord {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl RawVendorRecord {
    /// Wraps an already-decoded JSON object.
    #[must_use]
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from any JSON value. Non-object values yield an empty
    /// record, which never passes validation.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Trimmed, non-empty text for `key`. Numbers are rendered as text so that
    /// integer ids and string ids are handled the same way.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Finite number for `key`, accepting numeric strings.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = self.fields.get(key)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
            .filter(|v| v.is_finite())
    }

    /// Provider identifier: `objectid`, falling back to `id`.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.text("objectid").or_else(|| self.text("id"))
    }

    /// Parsed position, present only when both components are finite numbers.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(
            self.number("latitude")?,
            self.number("longitude")?,
        ))
    }
}

/// Returns `true` iff `record` may enter the working set.
///
/// Requires finite `latitude`/`longitude` inside `bbox` (inclusive) and
/// non-empty identity fields: id, `applicant` (name), `fooditems` (category).
#[must_use]
pub fn is_valid_record(record: &RawVendorRecord, bbox: &BoundingBox) -> bool {
    let in_region = record.coordinate().is_some_and(|c| bbox.contains(c));
    in_region
        && record.id().is_some()
        && record.text("applicant").is_some()
        && record.text("fooditems").is_some()
}

/// A validated vendor.
///
/// Working-set entries are never mutated; `distance` is only ever set on the
/// copies produced by the radius filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub category: String,
    pub facility_type: Option<String>,
    pub status: Option<String>,
    pub address: Option<String>,
    pub permit: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Miles from the active reference point, when one is set.
    pub distance: Option<f64>,
}

impl Vendor {
    /// Converts a raw record, returning `None` when it fails validation.
    #[must_use]
    pub fn from_raw(record: &RawVendorRecord, bbox: &BoundingBox) -> Option<Self> {
        if !is_valid_record(record, bbox) {
            return None;
        }
        let position = record.coordinate()?;
        Some(Self {
            id: record.id()?,
            name: record.text("applicant")?,
            category: record.text("fooditems")?,
            facility_type: record.text("facilitytype"),
            status: record.text("status"),
            address: record.text("address"),
            permit: record.text("permit"),
            latitude: position.latitude,
            longitude: position.longitude,
            distance: None,
        })
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Individual food items from the `:`/`;` separated category text.
    #[must_use]
    pub fn food_items(&self) -> Vec<&str> {
        self.category
            .split([':', ';'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// A copy carrying `distance`; `self` is left untouched.
    #[must_use]
    pub fn with_distance(&self, distance: f64) -> Self {
        Self {
            distance: Some(distance),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "vendor_test.rs"]
mod tests;
