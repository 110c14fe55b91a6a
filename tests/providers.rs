//! Integration tests for the JSON provider adapters and alert feeds,
//! against wiremock stand-ins for the real endpoints.

use chrono::{DateTime, Duration, Local, TimeZone};
use pendler::alerts::{PoliceAlerts, SpeedCameras};
use pendler::clock::Clock;
use pendler::error::Error;
use pendler::http_client::HttpClient;
use pendler::providers::{gmaps::GoogleMaps, tomtom::TomTom, waze::Waze};
use pendler::types::{GeoPoint, TrafficDelay};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedClock(DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

fn origin() -> GeoPoint {
    GeoPoint::new(51.5045685, 6.9971393)
}

fn destination() -> GeoPoint {
    GeoPoint::new(51.668189, 6.148282)
}

fn fixed_clock() -> (Arc<FixedClock>, DateTime<Local>) {
    // Mid-day anchor keeps same-day "HH:mm" feed timestamps unambiguous.
    let now = Local.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
    (Arc::new(FixedClock(now)), now)
}

fn http() -> HttpClient {
    HttpClient::new(5_000)
}

#[tokio::test]
async fn tomtom_normalizes_the_first_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/routing/1/calculateRoute/.*"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{
                "summary": {
                    "lengthInMeters": 12000,
                    "travelTimeInSeconds": 1800,
                    "trafficDelayInSeconds": 0,
                    "trafficLengthInMeters": 0
                },
                "guidance": {
                    "instructions": [
                        { "roadNumbers": ["A42"] },
                        { "roadNumbers": ["B224"] }
                    ]
                }
            }]
        })))
        .mount(&server)
        .await;

    let (clock, now) = fixed_clock();
    let adapter = TomTom::new(http(), clock, "test-key").with_base_url(&server.uri());
    let info = adapter.commute(origin(), destination()).await.unwrap();

    assert_eq!(info.minutes, 30);
    assert_eq!(info.distance_km, Some(12.0));
    assert_eq!(info.delay, TrafficDelay::Normal);
    assert_eq!(info.eta, (now + Duration::minutes(30)).format("%H:%M").to_string());
    assert_eq!(
        serde_json::to_value(&info.delay).unwrap(),
        json!("normal")
    );
}

#[tokio::test]
async fn tomtom_non_2xx_is_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/routing/.*"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (clock, _) = fixed_clock();
    let adapter = TomTom::new(http(), clock, "k").with_base_url(&server.uri());
    let err = adapter.commute(origin(), destination()).await.unwrap_err();
    assert!(matches!(err, Error::ProviderRequest(_)));
}

#[tokio::test]
async fn tomtom_empty_routes_is_a_shape_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/routing/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "routes": [] })))
        .mount(&server)
        .await;

    let (clock, _) = fixed_clock();
    let adapter = TomTom::new(http(), clock, "k").with_base_url(&server.uri());
    let err = adapter.commute(origin(), destination()).await.unwrap_err();
    assert!(matches!(err, Error::ProviderShape(_)));
}

#[tokio::test]
async fn waze_posts_the_livemap_body_and_takes_the_first_alternative() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/live-map/api/user-drive"))
        .and(query_param("geo_env", "row"))
        .and(body_partial_json(json!({
            "from": { "y": 51.5045685, "x": 6.9971393 },
            "to": { "y": 51.668189, "x": 6.148282 },
            "nPaths": 3,
            "useCase": "LIVEMAP_PLANNING"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alternatives": [
                {
                    "response": {
                        "isFastest": true,
                        "jams": [{ "id": 1, "severity": 2 }],
                        "routeName": "A42",
                        "totalLength": 61_540,
                        "totalSeconds": 2_345
                    }
                },
                {
                    "response": {
                        "isFastest": false,
                        "jams": [],
                        "routeName": "A3",
                        "totalLength": 70_000,
                        "totalSeconds": 2_000
                    }
                }
            ]
        })))
        .mount(&server)
        .await;

    let (clock, now) = fixed_clock();
    let adapter = Waze::new(http(), clock).with_base_url(&server.uri());
    let info = adapter.commute(origin(), destination()).await.unwrap();

    // First alternative wins, not the faster second one.
    assert_eq!(info.minutes, 40);
    assert_eq!(info.distance_km, Some(61.5));
    assert_eq!(info.delay, TrafficDelay::Normal);
    assert_eq!(info.eta, (now + Duration::minutes(40)).format("%H:%M").to_string());
}

#[tokio::test]
async fn waze_without_alternatives_is_a_shape_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/live-map/api/user-drive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "alternatives": [] })))
        .mount(&server)
        .await;

    let (clock, _) = fixed_clock();
    let adapter = Waze::new(http(), clock).with_base_url(&server.uri());
    let err = adapter.commute(origin(), destination()).await.unwrap_err();
    assert!(matches!(err, Error::ProviderShape(_)));
}

fn gmaps_body() -> String {
    let payload = json!([
        [
            null,
            [
                [["head", "A42 und A57", [63_700.0], 3, 4, 5, 6, 7, 8, 9, [[4_200.0], 2]]],
                [["head", "A3", [58_100.0], 3, 4, 5, 6, 7, 8, 9, [[4_500.0], 0]]]
            ]
        ]
    ]);
    format!(")]}}'{payload}")
}

#[tokio::test]
async fn gmaps_strips_the_prefix_and_maps_the_traffic_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/preview/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gmaps_body()))
        .mount(&server)
        .await;

    let (clock, now) = fixed_clock();
    let adapter = GoogleMaps::new(http(), clock).with_base_url(&server.uri());
    let info = adapter.commute(origin(), destination()).await.unwrap();

    assert_eq!(info.minutes, 70);
    assert_eq!(info.distance_km, Some(63.7));
    assert_eq!(info.delay, TrafficDelay::Medium);
    assert_eq!(info.eta, (now + Duration::minutes(70)).format("%H:%M").to_string());
}

#[tokio::test]
async fn gmaps_unparseable_payload_is_a_shape_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/preview/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(")]}'this is not json"))
        .mount(&server)
        .await;

    let (clock, _) = fixed_clock();
    let adapter = GoogleMaps::new(http(), clock).with_base_url(&server.uri());
    let err = adapter.commute(origin(), destination()).await.unwrap_err();
    assert!(matches!(err, Error::ProviderShape(_)));
}

#[tokio::test]
async fn police_alerts_filter_and_format() {
    let server = MockServer::start().await;
    let (clock, now) = fixed_clock();

    Mock::given(method("GET"))
        .and(path("/row-rtserver/web/TGeoRSS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alerts": [
                {
                    "confidence": 3,
                    "location": { "x": 6.99, "y": 51.50 },
                    "pubMillis": (now - Duration::hours(2)).timestamp_millis(),
                    "nThumbsUp": 16,
                    "street": "A42",
                    "type": "POLICE",
                    "subtype": "POLICE_VISIBLE"
                },
                {
                    "confidence": 4,
                    "location": { "x": 6.98, "y": 51.51 },
                    "pubMillis": (now - Duration::hours(13)).timestamp_millis(),
                    "street": "A3",
                    "type": "POLICE"
                },
                {
                    "confidence": 2,
                    "location": { "x": 6.97, "y": 51.52 },
                    "pubMillis": (now - Duration::hours(1)).timestamp_millis(),
                    "street": "A40",
                    "type": "HAZARD",
                    "reportDescription": "Gegenstand auf Fahrbahn"
                }
            ]
        })))
        .mount(&server)
        .await;

    let feed = PoliceAlerts::new(http(), clock).with_base_url(&server.uri());
    let alerts = feed.fetch(origin()).await.unwrap();
    assert_eq!(alerts, vec!["A42 vor 2h (3)"]);
}

#[tokio::test]
async fn nearest_camera_is_selected_with_ages_for_mobile_type() {
    let server = MockServer::start().await;
    let (clock, now) = fixed_clock();

    Mock::given(method("GET"))
        .and(path("/api/4.0/pois.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pois": [
                {
                    "confirm_date": (now - Duration::minutes(10)).format("%H:%M").to_string(),
                    "create_date": (now - Duration::hours(3)).format("%H:%M").to_string(),
                    "lat": "51.505",
                    "lng": "6.998",
                    "type": "1",
                    "vmax": "30"
                },
                {
                    "confirm_date": "",
                    "create_date": "01.01.2020",
                    "lat": "51.52",
                    "lng": "7.05",
                    "type": "107",
                    "vmax": "80"
                }
            ]
        })))
        .mount(&server)
        .await;

    let feed = SpeedCameras::new(http(), clock).with_base_url(&server.uri());
    let camera = feed.fetch_nearest(origin()).await.unwrap().unwrap();

    assert_eq!(camera.speed_limit_kph, "30");
    assert_eq!(camera.since.as_deref(), Some("3h"));
    assert_eq!(camera.last_confirmed.as_deref(), Some("10min"));
    assert!(camera.distance_km < 0.5);
}

#[tokio::test]
async fn empty_camera_feed_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/pois.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pois": [] })))
        .mount(&server)
        .await;

    let (clock, _) = fixed_clock();
    let feed = SpeedCameras::new(http(), clock).with_base_url(&server.uri());
    assert_eq!(feed.fetch_nearest(origin()).await.unwrap(), None);
}
