//! Integration tests for `GeocodeClient::lookup` against a local
//! `wiremock` server.

use foodtruck_client::{ClientError, GeocodeClient};
use foodtruck_core::{Coordinate, Geocoder};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GeocodeClient {
    GeocodeClient::new(&server.uri(), "pk.test-token", 5, "foodtruck-test/0.1", 0, 0)
        .expect("failed to build test GeocodeClient")
}

#[tokio::test]
async fn lookup_returns_first_feature_center_as_lat_lon() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocoding/v5/mapbox.places/Ferry%20Building.json"))
        .and(query_param("access_token", "pk.test-token"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [
                { "center": [-122.3937, 37.7955], "place_name": "Ferry Building" },
                { "center": [0.0, 0.0] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let point = test_client(&server).geocode("Ferry Building").await.unwrap();
    assert_eq!(point, Some(Coordinate::new(37.7955, -122.3937)));
}

#[tokio::test]
async fn lookup_with_no_features_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
        .mount(&server)
        .await;

    let point = test_client(&server).lookup("nowhere at all").await.unwrap();
    assert!(point.is_none());
}

#[tokio::test]
async fn blank_address_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let point = test_client(&server).lookup("   ").await.unwrap();
    assert!(point.is_none());
}

#[tokio::test]
async fn unauthorized_error_does_not_leak_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server).lookup("1 Market St").await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 401, .. }));
    assert!(!err.to_string().contains("pk.test-token"));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server).lookup("1 Market St").await;
    assert!(
        matches!(result, Err(ClientError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}
