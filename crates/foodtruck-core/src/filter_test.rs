use super::*;

fn vendor(id: &str, name: &str, category: &str, lat: f64, lon: f64) -> Vendor {
    Vendor {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        facility_type: None,
        status: None,
        address: None,
        permit: None,
        latitude: lat,
        longitude: lon,
        distance: None,
    }
}

fn with_distance(id: &str, distance: Option<f64>) -> Vendor {
    let mut v = vendor(id, id, "Food", 37.78, -122.41);
    v.distance = distance;
    v
}

fn ids(vendors: &[Vendor]) -> Vec<&str> {
    vendors.iter().map(|v| v.id.as_str()).collect()
}

const CIVIC_CENTER: Coordinate = Coordinate::new(37.7749, -122.4194);

// ---------------------------------------------------------------------------
// text_matches
// ---------------------------------------------------------------------------

#[test]
fn empty_needle_matches_everything() {
    let vendors = [
        vendor("1", "Taco Bell", "Mexican", 37.78, -122.41),
        vendor("2", "Curry Up", "Indian", 37.79, -122.42),
    ];
    assert!(vendors.iter().all(|v| text_matches(v, "")));
}

#[test]
fn matches_name_case_insensitively() {
    let v = vendor("1", "Taco Bell", "Mexican", 37.78, -122.41);
    assert!(text_matches(&v, "taco"));
    assert!(text_matches(&v, "co be"));
    assert!(!text_matches(&v, "curry"));
}

#[test]
fn matches_category_facility_type_and_status() {
    let mut v = vendor("1", "Anon", "Hot Dogs: Soda", 37.78, -122.41);
    v.facility_type = Some("Push Cart".to_string());
    v.status = Some("APPROVED".to_string());
    assert!(text_matches(&v, "hot dogs"));
    assert!(text_matches(&v, "cart"));
    assert!(text_matches(&v, "approved"));
    assert!(!text_matches(&v, "truck"));
}

#[test]
fn missing_optional_fields_do_not_block_other_matches() {
    let v = vendor("1", "Curry Up", "Indian", 37.79, -122.42);
    assert!(v.facility_type.is_none() && v.status.is_none());
    assert!(text_matches(&v, "indian"));
}

#[test]
fn address_is_not_searched() {
    let mut v = vendor("1", "Curry Up", "Indian", 37.79, -122.42);
    v.address = Some("50 FREMONT ST".to_string());
    assert!(!text_matches(&v, "fremont"));
}

// ---------------------------------------------------------------------------
// RadiusFilter / apply_filters
// ---------------------------------------------------------------------------

#[test]
fn measure_attaches_distance_to_copy() {
    let original = vendor("1", "Near", "Food", 37.7849, -122.4094);
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 1.0,
    };
    let (measured, within) = filter.measure(&original);
    assert!(within);
    let d = measured.distance.expect("distance attached");
    assert!(d > 0.8 && d < 0.95, "got {d}");
    assert!(original.distance.is_none());
}

#[test]
fn text_only_when_no_radius() {
    let vendors = [
        vendor("1", "Taco Bell", "Mexican", 37.78, -122.41),
        vendor("2", "Curry Up", "Indian", 37.79, -122.42),
    ];
    let results = apply_filters(&vendors, "indian", None);
    assert_eq!(ids(&results), ["2"]);
    assert!(results[0].distance.is_none());
}

#[test]
fn text_match_outside_radius_is_included() {
    let far = vendor("far", "Curry Up", "Indian", 37.70, -122.50);
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 1.0,
    };
    let results = apply_filters(std::slice::from_ref(&far), "curry", Some(&filter));
    assert_eq!(ids(&results), ["far"]);
    assert!(results[0].distance.unwrap() > 1.0);
}

#[test]
fn radius_match_without_text_is_included() {
    let near = vendor("near", "Taco Bell", "Mexican", 37.7849, -122.4094);
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 1.0,
    };
    let results = apply_filters(std::slice::from_ref(&near), "sushi", Some(&filter));
    assert_eq!(ids(&results), ["near"]);
}

#[test]
fn neither_text_nor_radius_is_excluded() {
    let far = vendor("far", "Taco Bell", "Mexican", 37.70, -122.50);
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 1.0,
    };
    assert!(apply_filters(&[far], "sushi", Some(&filter)).is_empty());
}

#[test]
fn radius_results_are_sorted_by_distance() {
    let vendors = [
        vendor("far", "A", "Food", 37.70, -122.50),
        vendor("mid", "B", "Food", 37.7849, -122.4094),
        vendor("here", "C", "Food", 37.7749, -122.4194),
    ];
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 10.0,
    };
    let results = apply_filters(&vendors, "", Some(&filter));
    assert_eq!(ids(&results), ["here", "mid", "far"]);
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn empty_text_with_radius_keeps_only_nearby() {
    let vendors = [
        vendor("near", "A", "Food", 37.7849, -122.4094),
        vendor("far", "B", "Food", 37.70, -122.50),
    ];
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: 1.0,
    };
    let results = apply_filters(&vendors, "", Some(&filter));
    assert_eq!(ids(&results), ["near"]);
}

#[test]
fn radius_boundary_is_inclusive() {
    let v = vendor("edge", "A", "Food", 37.7849, -122.4094);
    let exact = distance_miles(CIVIC_CENTER, v.coordinate());
    let filter = RadiusFilter {
        origin: CIVIC_CENTER,
        radius_miles: exact,
    };
    assert!(filter.measure(&v).1);
}

// ---------------------------------------------------------------------------
// sort_by_distance
// ---------------------------------------------------------------------------

#[test]
fn sort_puts_missing_distance_last_and_is_stable() {
    let mut vendors = vec![
        with_distance("none-a", None),
        with_distance("two-a", Some(2.0)),
        with_distance("one", Some(1.0)),
        with_distance("none-b", None),
        with_distance("two-b", Some(2.0)),
    ];
    sort_by_distance(&mut vendors);
    assert_eq!(ids(&vendors), ["one", "two-a", "two-b", "none-a", "none-b"]);
}

#[test]
fn sort_without_distances_keeps_input_order() {
    let mut vendors = vec![
        with_distance("c", None),
        with_distance("a", None),
        with_distance("b", None),
    ];
    sort_by_distance(&mut vendors);
    assert_eq!(ids(&vendors), ["c", "a", "b"]);
}

// ---------------------------------------------------------------------------
// RadiusLimits / SearchQuery
// ---------------------------------------------------------------------------

#[test]
fn radius_limits_clamp() {
    let limits = RadiusLimits::default();
    assert!((limits.clamp(0.2) - 1.0).abs() < f64::EPSILON);
    assert!((limits.clamp(25.0) - 10.0).abs() < f64::EPSILON);
    assert!((limits.clamp(3.5) - 3.5).abs() < f64::EPSILON);
    assert!((limits.clamp(f64::NAN) - 5.0).abs() < f64::EPSILON);
}

#[test]
fn query_needle_is_trimmed_and_lowercased() {
    let mut query = SearchQuery::new(&RadiusLimits::default());
    assert_eq!(query.needle(), "");
    assert!((query.radius_miles - 5.0).abs() < f64::EPSILON);
    query.text = "  InDiAn ".to_string();
    assert_eq!(query.needle(), "indian");
}

// ---------------------------------------------------------------------------
// End-to-end over a small working set
// ---------------------------------------------------------------------------

#[test]
fn indian_query_returns_only_curry_up() {
    let vendors = [
        vendor("1", "Taco Bell", "Mexican", 37.78, -122.41),
        vendor("2", "Curry Up", "Indian", 37.79, -122.42),
    ];
    let results = apply_filters(&vendors, "indian", None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Curry Up");
}
