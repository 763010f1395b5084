use foodtruck_core::{Coordinate, SearchQuery, Vendor};
use serde::Serialize;

/// Outcome of the most recent search, as shown to the user.
///
/// `NoQuery` and `NoMatches` are distinct: the first means nothing has been
/// asked yet, the second that a search ran and found nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultStatus {
    NoQuery,
    NoMatches,
    Matches,
    /// An address search failed; results from before the attempt are kept.
    SearchFailed { reason: String },
}

/// Everything a presentation layer needs to render one frame of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub status: ResultStatus,
    /// Ordered results. Under `NoQuery` this is the whole working set.
    pub vendors: Vec<Vendor>,
    pub query: SearchQuery,
    pub reference: Option<Coordinate>,
    pub show_all: bool,
    pub viewport: Coordinate,
    pub selected: Option<Vendor>,
    /// Evaluation that produced `vendors`; zero before the first one.
    pub generation: u64,
}

impl SearchSnapshot {
    pub(crate) fn initial(query: SearchQuery, viewport: Coordinate) -> Self {
        Self {
            status: ResultStatus::NoQuery,
            vendors: Vec::new(),
            query,
            reference: None,
            show_all: false,
            viewport,
            selected: None,
            generation: 0,
        }
    }

    /// Vendors to draw as map markers: the results, but only while
    /// show-all is on.
    #[must_use]
    pub fn markers(&self) -> &[Vendor] {
        if self.show_all {
            &self.vendors
        } else {
            &[]
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ResultStatus::SearchFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodtruck_core::RadiusLimits;

    fn snapshot() -> SearchSnapshot {
        SearchSnapshot::initial(
            SearchQuery::new(&RadiusLimits::default()),
            Coordinate::new(37.7749, -122.4194),
        )
    }

    #[test]
    fn markers_hidden_until_show_all() {
        let mut s = snapshot();
        s.vendors.push(Vendor {
            id: "1".to_owned(),
            name: "Curry Up".to_owned(),
            category: "Indian".to_owned(),
            facility_type: None,
            status: None,
            address: None,
            permit: None,
            latitude: 37.78,
            longitude: -122.41,
            distance: None,
        });
        assert!(s.markers().is_empty());
        s.show_all = true;
        assert_eq!(s.markers().len(), 1);
    }

    #[test]
    fn status_serializes_with_kind_tag() {
        let failed = ResultStatus::SearchFailed {
            reason: "timeout".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"kind": "search_failed", "reason": "timeout"})
        );
        assert_eq!(
            serde_json::to_value(ResultStatus::NoQuery).unwrap(),
            serde_json::json!({"kind": "no_query"})
        );
    }
}
