//! The validated, in-memory vendor collection that searches run against.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::geo::BoundingBox;
use crate::vendor::{RawVendorRecord, Vendor};

/// Outcome counts from building a [`WorkingSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Records that entered the working set.
    pub accepted: usize,
    /// Records dropped by the coordinate validator.
    pub skipped: usize,
    /// Valid records dropped because an earlier record had the same id.
    pub duplicates: usize,
}

/// Vendors keyed by id, in provider order.
///
/// Built wholesale from one fetch and never patched afterwards; a refresh
/// produces a new set that replaces the old one.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    vendors: Vec<Vendor>,
    index: HashMap<String, usize>,
    fetched_at: DateTime<Utc>,
}

impl WorkingSet {
    /// An empty set, used before the first successful fetch.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vendors: Vec::new(),
            index: HashMap::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Validates `records` against `bbox` and keeps the survivors.
    ///
    /// Invalid records are skipped silently; the first record wins when ids
    /// collide.
    #[must_use]
    pub fn from_records(records: &[RawVendorRecord], bbox: &BoundingBox) -> (Self, ValidationReport) {
        let mut set = Self::empty();
        let mut report = ValidationReport::default();

        for record in records {
            let Some(vendor) = Vendor::from_raw(record, bbox) else {
                report.skipped += 1;
                tracing::trace!(id = ?record.id(), "vendor record failed validation");
                continue;
            };
            if set.index.contains_key(&vendor.id) {
                report.duplicates += 1;
                tracing::debug!(id = %vendor.id, "duplicate vendor id skipped");
                continue;
            }
            set.index.insert(vendor.id.clone(), set.vendors.len());
            set.vendors.push(vendor);
            report.accepted += 1;
        }

        (set, report)
    }

    /// Builds a set from already-validated vendors, dropping duplicate ids.
    #[must_use]
    pub fn from_vendors(vendors: impl IntoIterator<Item = Vendor>) -> Self {
        let mut set = Self::empty();
        for vendor in vendors {
            if set.index.contains_key(&vendor.id) {
                continue;
            }
            set.index.insert(vendor.id.clone(), set.vendors.len());
            set.vendors.push(vendor);
        }
        set
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Vendor> {
        self.index.get(id).map(|&i| &self.vendors[i])
    }

    /// Vendors in insertion order.
    #[must_use]
    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(id: &str, name: &str, lat: &str, lon: &str) -> RawVendorRecord {
        RawVendorRecord::from_value(json!({
            "objectid": id,
            "applicant": name,
            "fooditems": "Food",
            "latitude": lat,
            "longitude": lon
        }))
    }

    #[test]
    fn keeps_valid_records_in_order() {
        let records = vec![
            raw("1", "A", "37.78", "-122.41"),
            raw("2", "B", "0", "0"),
            raw("3", "C", "37.79", "-122.42"),
        ];
        let (set, report) = WorkingSet::from_records(&records, &BoundingBox::san_francisco());
        assert_eq!(
            report,
            ValidationReport {
                accepted: 2,
                skipped: 1,
                duplicates: 0
            }
        );
        let names: Vec<_> = set.vendors().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
        assert!(set.get("2").is_none());
        assert_eq!(set.get("3").map(|v| v.name.as_str()), Some("C"));
    }

    #[test]
    fn first_duplicate_id_wins() {
        let records = vec![
            raw("1", "First", "37.78", "-122.41"),
            raw("1", "Second", "37.79", "-122.42"),
        ];
        let (set, report) = WorkingSet::from_records(&records, &BoundingBox::san_francisco());
        assert_eq!(report.accepted, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(set.get("1").map(|v| v.name.as_str()), Some("First"));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let (set, report) = WorkingSet::from_records(&[], &BoundingBox::san_francisco());
        assert!(set.is_empty());
        assert_eq!(report, ValidationReport::default());
    }
}
