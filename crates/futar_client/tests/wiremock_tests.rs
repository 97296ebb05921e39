//! Integration tests for the FUTÁR client (wiremock-based)

use serde_json::{Value, json};
use wiremock::matchers::{any, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use futar_client::{
    AlertSearchOptions, ArrivalsAndDeparturesOptions, DefaultingMode, FutarApi, FutarClient,
    FutarConfig, FutarError, Optimize, PlanTripOptions, RequestParams, RouteDetailsForStopOptions,
    RouteOptions, ScheduleForStopOptions, SearchOptions, StopOptions, StopsForLocationOptions,
    VehiclesForStopOptions,
};

fn config_for_mock(base_url: &str) -> FutarConfig {
    FutarConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..FutarConfig::default()
    }
}

fn client_for(server: &MockServer) -> FutarClient {
    FutarClient::new(&config_for_mock(&server.uri())).unwrap()
}

fn ok_envelope(data: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 200,
        "text": "OK",
        "data": data,
    }))
}

fn sample_stop_data() -> Value {
    json!({
        "entry": {
            "id": "BKK_F01234",
            "lat": 47.497_913,
            "lon": 19.054_383,
            "name": "Deák Ferenc tér M",
            "routeIds": ["BKK_3040", "BKK_0050"]
        },
        "references": {
            "routes": {
                "BKK_3040": { "shortName": "47", "type": "TRAM" }
            }
        }
    })
}

/// Mount a catch-all mock that fails verification if any request arrives
async fn expect_no_request(server: &MockServer) {
    Mock::given(any())
        .respond_with(ok_envelope(&Value::Null))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_stop_scoped_methods_reject_missing_stop_id() {
    let server = MockServer::start().await;
    expect_no_request(&server).await;
    let client = client_for(&server);

    let results = [
        client
            .arrivals_and_departures_for_stop(ArrivalsAndDeparturesOptions::default())
            .await,
        client
            .schedule_for_stop(ScheduleForStopOptions::default())
            .await,
        client
            .route_details_for_stop(RouteDetailsForStopOptions::default())
            .await,
        client
            .vehicles_for_stop(VehiclesForStopOptions::default())
            .await,
        client.stop(StopOptions::default()).await,
    ];

    for result in results {
        let err = result.unwrap_err();
        assert!(matches!(err, FutarError::InvalidArgument(_)), "{err:?}");
        assert!(err.to_string().contains("stopId"));
    }
}

#[tokio::test]
async fn test_bare_stop_id_equals_options_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arrivals-and-departures-for-stop.json"))
        .and(query_param("stopId", "F01234"))
        .and(query_param("minutesBefore", "0"))
        .and(query_param("minutesAfter", "30"))
        .and(query_param("onlyDepartures", "true"))
        .and(query_param("includeReferences", "true"))
        .and(query_param("version", "3"))
        .respond_with(ok_envelope(&json!({ "entry": { "stopId": "F01234" } })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let shorthand = client
        .arrivals_and_departures_for_stop("F01234".into())
        .await
        .unwrap();
    let mapping = client
        .arrivals_and_departures_for_stop(ArrivalsAndDeparturesOptions {
            stop_id: Some("F01234".to_string()),
            ..ArrivalsAndDeparturesOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(shorthand, mapping);
}

#[tokio::test]
async fn test_only_departures_false_is_still_sent_as_true() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arrivals-and-departures-for-stop.json"))
        .and(query_param("onlyDepartures", "true"))
        .respond_with(ok_envelope(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .arrivals_and_departures_for_stop(ArrivalsAndDeparturesOptions {
            only_departures: Some(false),
            ..ArrivalsAndDeparturesOptions::from("F01234")
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unset_defaulting_honors_explicit_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arrivals-and-departures-for-stop.json"))
        .and(query_param("onlyDepartures", "false"))
        .and(query_param("minutesAfter", "0"))
        .respond_with(ok_envelope(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = FutarConfig {
        defaulting: DefaultingMode::Unset,
        ..config_for_mock(&server.uri())
    };
    let client = FutarClient::new(&config).unwrap();
    client
        .arrivals_and_departures_for_stop(ArrivalsAndDeparturesOptions {
            only_departures: Some(false),
            minutes_after: Some(0),
            ..ArrivalsAndDeparturesOptions::from("F01234")
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stops_for_location_missing_radius() {
    let server = MockServer::start().await;
    expect_no_request(&server).await;
    let client = client_for(&server);

    let err = client
        .stops_for_location(StopsForLocationOptions {
            lat: Some(47.5),
            lon: Some(19.05),
            ..StopsForLocationOptions::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FutarError::InvalidArgument(_)));
    assert!(err.to_string().contains("radius"));
}

#[tokio::test]
async fn test_stops_for_location_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stops-for-location.json"))
        .and(query_param("lat", "47.5"))
        .and(query_param("lon", "19.05"))
        .and(query_param("radius", "500"))
        .and(query_param("includeReferences", "true"))
        .and(query_param("version", "3"))
        .respond_with(ok_envelope(&json!({ "list": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let data = client
        .stops_for_location(StopsForLocationOptions::around(47.5, 19.05, 500.0))
        .await
        .unwrap();
    assert_eq!(data, json!({ "list": [] }));
}

#[tokio::test]
async fn test_stop_resolves_with_unwrapped_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stop/BKK_F01234.json"))
        .and(query_param_is_missing("stopId"))
        .respond_with(ok_envelope(&sample_stop_data()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let data = client.stop("BKK_F01234".into()).await.unwrap();
    assert_eq!(data, sample_stop_data());
}

#[tokio::test]
async fn test_route_id_in_path_below_prefixed_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/where/route/BKK_3040.json"))
        .respond_with(ok_envelope(&json!({ "entry": { "id": "BKK_3040" } })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for_mock(&format!("{}/api/where", server.uri()));
    let client = FutarClient::new(&config).unwrap();
    let data = client.route("BKK_3040".into()).await.unwrap();
    assert_eq!(data["entry"]["id"], "BKK_3040");
}

#[tokio::test]
async fn test_route_scoped_method_rejects_missing_route_id() {
    let server = MockServer::start().await;
    expect_no_request(&server).await;
    let client = client_for(&server);

    let err = client.route(RouteOptions::default()).await.unwrap_err();
    assert!(err.to_string().contains("routeId"));
}

#[tokio::test]
async fn test_route_details_defaults_related_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route-details.json"))
        .and(query_param("routeId", "BKK_3040"))
        .and(query_param("related", "false"))
        .respond_with(ok_envelope(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.route_details("BKK_3040".into()).await.unwrap();
}

#[tokio::test]
async fn test_upstream_error_rejects_every_method() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 404,
            "text": "Not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let results = [
        client
            .arrivals_and_departures_for_stop("F01234".into())
            .await,
        client
            .stops_for_location(StopsForLocationOptions::around(47.5, 19.05, 500.0))
            .await,
        client.schedule_for_stop("F01234".into()).await,
        client.route_details_for_stop("F01234".into()).await,
        client.vehicles_for_stop("F01234".into()).await,
        client.stop("F01234".into()).await,
        client.route("BKK_3040".into()).await,
        client.route_details("BKK_3040".into()).await,
        client.vehicles_for_route("BKK_3040".into()).await,
        client.trip_details("BKK_B8471".into()).await,
        client.search("Deák".into()).await,
        client.metadata().await,
        client.bicycle_rental().await,
        client.alert_search(AlertSearchOptions::default()).await,
        client
            .plan_trip(PlanTripOptions::between(47.5, 19.05, 47.6, 19.06))
            .await,
    ];

    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.code(), Some(404));
        assert!(err.is_invalid_argument());
    }
}

#[tokio::test]
async fn test_upstream_error_with_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "text": "Internal error"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.search("Deák".into()).await.unwrap_err();
    assert!(matches!(err, FutarError::Upstream { code: 500, .. }));
    assert_eq!(err.to_string(), "Internal error");
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata.json"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.metadata().await.unwrap_err();
    assert!(matches!(err, FutarError::ParseError(_)));
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_search_requires_query() {
    let server = MockServer::start().await;
    expect_no_request(&server).await;
    let client = client_for(&server);

    let err = client.search(SearchOptions::default()).await.unwrap_err();
    assert!(err.to_string().contains("query"));
}

#[tokio::test]
async fn test_metadata_and_bicycle_rental_force_no_references() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata.json"))
        .and(query_param("includeReferences", "false"))
        .and(query_param("version", "3"))
        .respond_with(ok_envelope(&json!({ "entry": {} })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bicycle-rental.json"))
        .and(query_param("includeReferences", "false"))
        .respond_with(ok_envelope(&json!({ "list": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.config().include_references);
    client.metadata().await.unwrap();
    client.bicycle_rental().await.unwrap();
}

#[tokio::test]
async fn test_alert_search_defaults_to_empty_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alert-search.json"))
        .and(query_param("query", ""))
        .respond_with(ok_envelope(&json!({ "list": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .alert_search(AlertSearchOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_plan_trip_default_quick() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plan-trip.json"))
        .and(query_param("fromPlace", "47.5,19.05"))
        .and(query_param("toPlace", "47.6,19.06"))
        .and(query_param("optimize", "QUICK"))
        .and(query_param("mode", "WALK,SUBWAY,RAIL,FERRY,TRAM,TROLLEYBUS,BUS"))
        .and(query_param("maxWalkDistance", "3000"))
        .and(query_param_is_missing("triangleSafetyFactor"))
        .respond_with(ok_envelope(&json!({ "plan": { "itineraries": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let data = client
        .plan_trip(PlanTripOptions::between(47.5, 19.05, 47.6, 19.06))
        .await
        .unwrap();
    assert_eq!(data["plan"]["itineraries"], json!([]));
}

#[tokio::test]
async fn test_plan_trip_triangle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plan-trip.json"))
        .and(query_param("optimize", "TRIANGLE"))
        .and(query_param("triangleSafetyFactor", "1"))
        .and(query_param("triangleTimeFactor", "0"))
        .and(query_param("triangleSlopeFactor", "0"))
        .respond_with(ok_envelope(&json!({ "plan": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .plan_trip(
            PlanTripOptions::between(47.5, 19.05, 47.6, 19.06).with_optimize(Optimize::Triangle),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_plan_trip_missing_coordinates() {
    let server = MockServer::start().await;
    expect_no_request(&server).await;
    let client = client_for(&server);

    let err = client
        .plan_trip(PlanTripOptions {
            from_lat: Some(47.5),
            from_lon: Some(19.05),
            ..PlanTripOptions::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("toLat, toLon"));
}

#[tokio::test]
async fn test_send_request_passes_params_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vehicles-for-location.json"))
        .and(query_param("lat", "47.5"))
        .and(query_param_is_missing("version"))
        .respond_with(ok_envelope(&json!({ "list": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut params = RequestParams::new();
    params.set("lat", 47.5);
    let data = client
        .send_request("vehicles-for-location", &params)
        .await
        .unwrap();
    assert_eq!(data, json!({ "list": [] }));
}

#[tokio::test]
async fn test_is_healthy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata.json"))
        .respond_with(ok_envelope(&json!({ "entry": {} })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_connection_failure() {
    // Nothing listens on port 1
    let client = FutarClient::new(&config_for_mock("http://127.0.0.1:1")).unwrap();
    let err = client.metadata().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!client.is_healthy().await);
}
