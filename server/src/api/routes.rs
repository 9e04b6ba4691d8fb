use crate::api::error::handle_rejection;
use crate::api::handlers::{self, ScansQuery};
use crate::service::ScanService;
use std::convert::Infallible;
use std::path::PathBuf;
use warp::{Filter, Rejection, Reply};

const MAX_BODY_BYTES: u64 = 512 * 1024;

fn with_service(
    service: ScanService,
) -> impl Filter<Extract = (ScanService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// JSON endpoints under `/api`.
pub fn api(service: ScanService) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let submit = warp::path!("api" / "scan")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .map(handlers::submit_scan);

    let latest = warp::path!("api" / "scans" / "latest")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::latest_scan);

    let scans = warp::path!("api" / "scans")
        .and(warp::get())
        .and(warp::query::<ScansQuery>())
        .and(with_service(service.clone()))
        .map(handlers::list_scans);

    let stats = warp::path!("api" / "stats")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::stats);

    let devices = warp::path!("api" / "devices")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::all_devices);

    let wifi_devices = warp::path!("api" / "devices" / "wifi")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::wifi_devices);

    let ble_devices = warp::path!("api" / "devices" / "ble")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::ble_devices);

    let wifi_device = warp::path!("api" / "devices" / "wifi" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::wifi_device);

    let ble_device = warp::path!("api" / "devices" / "ble" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::ble_device);

    let sensors = warp::path!("api" / "sensors")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::sensors);

    let map = warp::path!("api" / "map")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::map_data);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(handlers::health);

    let simulate = warp::path!("api" / "simulate")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service))
        .map(handlers::simulate);

    submit
        .or(latest)
        .or(scans)
        .or(stats)
        .or(devices)
        .or(wifi_devices)
        .or(ble_devices)
        .or(wifi_device)
        .or(ble_device)
        .or(sensors)
        .or(map)
        .or(health)
        .or(simulate)
}

/// The full HTTP surface: API, static UI, CORS, JSON error bodies and access log.
pub fn routes(
    service: ScanService,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::get()
        .and(warp::path::end())
        .and(warp::fs::file(static_dir.join("index.html")));
    let assets = warp::get().and(warp::fs::dir(static_dir));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    api(service)
        .or(index)
        .or(assets)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::log("scan_server::http"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use warp::http::StatusCode;
    use warp::hyper::body::Bytes;
    use warp::http::Response;

    fn app() -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        routes(ScanService::default(), PathBuf::from("missing-static-dir"))
    }

    fn body(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    async fn post_scan<F>(filter: &F, payload: Value) -> Response<Bytes>
    where
        F: Filter + 'static,
        F::Extract: Reply + Send,
    {
        warp::test::request()
            .method("POST")
            .path("/api/scan")
            .json(&payload)
            .reply(filter)
            .await
    }

    async fn get<F>(filter: &F, path: &str) -> Response<Bytes>
    where
        F: Filter + 'static,
        F::Extract: Reply + Send,
    {
        warp::test::request().method("GET").path(path).reply(filter).await
    }

    #[tokio::test]
    async fn submit_then_fetch_device_case_insensitively() {
        let app = app();
        let response = post_scan(
            &app,
            json!({
                "deviceId": "sensorA",
                "scanNumber": 1,
                "wifi": [{"bssid": "AA:BB", "rssi": -50, "distance": 5}]
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let receipt = body(&response);
        assert_eq!(receipt["success"], true);
        assert_eq!(receipt["scanId"], 1);

        let stats = body(&get(&app, "/api/stats").await);
        assert_eq!(stats["data"]["totalWiFi"], 1);

        let response = get(&app, "/api/devices/wifi/aa:bb").await;
        assert_eq!(response.status(), StatusCode::OK);
        let device = body(&response);
        assert_eq!(device["data"]["bssid"], "AA:BB");
        assert_eq!(device["data"]["detectionCount"], 1);
        assert_eq!(device["data"]["maxRssi"], -50);
        assert_eq!(device["data"]["minRssi"], -50);
        assert_eq!(device["data"]["avgRssi"], -50.0);
    }

    #[tokio::test]
    async fn missing_device_id_is_rejected_without_side_effects() {
        let app = app();
        let response = post_scan(&app, json!({"wifi": [{"bssid": "AA", "rssi": -40}]})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["success"], false);

        let stats = body(&get(&app, "/api/stats").await);
        assert_eq!(stats["data"]["totalScans"], 0);
        assert_eq!(stats["data"]["uniqueWiFi"], 0);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let app = app();
        let response = warp::test::request()
            .method("POST")
            .path("/api/scan")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&app)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_store_reports_no_data() {
        let app = app();
        let latest = get(&app, "/api/scans/latest").await;
        assert_eq!(latest.status(), StatusCode::OK);
        assert!(body(&latest)["data"].is_null());

        let map = get(&app, "/api/map").await;
        assert_eq!(map.status(), StatusCode::OK);
        let map = body(&map);
        assert_eq!(map["success"], true);
        assert!(map["data"].is_null());
    }

    #[tokio::test]
    async fn scans_are_paged_leniently() {
        let app = app();
        for n in 1..=5 {
            post_scan(&app, json!({"deviceId": "s", "scanNumber": n})).await;
        }

        let page = body(&get(&app, "/api/scans?offset=1&limit=2").await);
        assert_eq!(page["total"], 5);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);
        assert_eq!(page["data"][0]["scanNumber"], 2);

        let page = body(&get(&app, "/api/scans?limit=abc").await);
        assert_eq!(page["limit"], 5);
        assert_eq!(page["data"].as_array().unwrap().len(), 5);

        let page = body(&get(&app, "/api/scans?offset=99").await);
        assert!(page["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn map_projects_latest_scan() {
        let app = app();
        post_scan(
            &app,
            json!({
                "deviceId": "s",
                "wifi": [{"bssid": "AA:BB:CC:DD:EE:FF", "rssi": -50}],
                "ble": [{"address": "c4:de", "rssi": -70, "distance": 2.5}]
            }),
        )
        .await;

        let map = body(&get(&app, "/api/map").await);
        let data = &map["data"];
        assert_eq!(data["origin"]["name"], "Sensor");
        assert_eq!(data["wifi"][0]["bearing"], 258);
        assert_eq!(data["wifi"][0]["distance"], 10.0);
        assert_eq!(data["ble"][0]["distance"], 2.5);
        assert!(data["timestamp"].is_string());
    }

    #[tokio::test]
    async fn device_listings_and_lookup_failures() {
        let app = app();
        post_scan(
            &app,
            json!({
                "deviceId": "s",
                "wifi": [{"bssid": "AA", "rssi": -50}],
                "ble": [{"address": "c4:de", "rssi": -70}]
            }),
        )
        .await;

        let all = body(&get(&app, "/api/devices").await);
        assert_eq!(all["total"], 2);
        assert_eq!(all["data"][0]["deviceType"], "wifi");
        assert_eq!(all["data"][1]["deviceType"], "ble");

        let ble = get(&app, "/api/devices/ble/C4:DE").await;
        assert_eq!(ble.status(), StatusCode::OK);

        let missing = get(&app, "/api/devices/wifi/00:11").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&missing)["success"], false);

        let sensors = body(&get(&app, "/api/sensors").await);
        assert_eq!(sensors["data"][0]["deviceId"], "s");
        assert_eq!(sensors["data"][0]["scanCount"], 1);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = app();
        let response = get(&app, "/api/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&response)["error"], "Route not found");
    }

    #[tokio::test]
    async fn health_and_simulation() {
        let app = app();
        let response = warp::test::request()
            .method("POST")
            .path("/api/simulate")
            .json(&json!({"wifiCount": 2, "bleCount": 1, "seed": 5}))
            .reply(&app)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response)["wifi"], 2);

        let health = body(&get(&app, "/api/health").await);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["scansReceived"], 1);
        assert_eq!(health["bufferedScans"], 1);
        assert_eq!(health["bufferCapacity"], 100);
        assert!(health["uptime"].is_number());
    }

    #[tokio::test]
    async fn keyless_entry_is_skipped_and_report_accepted() {
        let app = app();
        let response = post_scan(
            &app,
            json!({
                "deviceId": "s",
                "wifi": [{"ssid": "hidden"}, {"bssid": "AA", "rssi": -50}],
                "ble": [{"name": "anonymous"}]
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response)["success"], true);

        let stats = body(&get(&app, "/api/stats").await);
        assert_eq!(stats["data"]["totalWiFi"], 2);
        assert_eq!(stats["data"]["totalBLE"], 1);
        assert_eq!(stats["data"]["uniqueWiFi"], 1);
        assert_eq!(stats["data"]["uniqueBLE"], 0);
    }

    #[tokio::test]
    async fn odd_typed_fields_do_not_reject_the_report() {
        let app = app();
        let negative = post_scan(&app, json!({"deviceId": "s", "scanNumber": -1})).await;
        assert_eq!(negative.status(), StatusCode::OK);

        let float = post_scan(
            &app,
            json!({
                "deviceId": "s",
                "scanNumber": "x-2",
                "battery": {"volts": 3.7},
                "wifi": [{"bssid": "AA:BB", "rssi": -50.0, "channel": "6", "distance": null}]
            }),
        )
        .await;
        assert_eq!(float.status(), StatusCode::OK);

        let device = body(&get(&app, "/api/devices/wifi/AA:BB").await);
        assert_eq!(device["data"]["maxRssi"], -50);
        assert_eq!(device["data"]["channel"], 6);

        let latest = body(&get(&app, "/api/scans/latest").await);
        assert_eq!(latest["data"]["scanNumber"], "x-2");
        assert_eq!(latest["data"]["battery"]["volts"], 3.7);

        let first = body(&get(&app, "/api/scans?limit=1").await);
        assert_eq!(first["data"][0]["scanNumber"], -1);
    }

    #[tokio::test]
    async fn encoded_device_keys_are_decoded() {
        let app = app();
        post_scan(
            &app,
            json!({
                "deviceId": "s",
                "wifi": [{"bssid": "AA:BB", "rssi": -50}],
                "ble": [{"address": "c4:de", "rssi": -70}]
            }),
        )
        .await;

        let wifi = get(&app, "/api/devices/wifi/aa%3Abb").await;
        assert_eq!(wifi.status(), StatusCode::OK);
        assert_eq!(body(&wifi)["data"]["bssid"], "AA:BB");

        let ble = get(&app, "/api/devices/ble/C4%3ADE").await;
        assert_eq!(ble.status(), StatusCode::OK);
        assert_eq!(body(&ble)["data"]["address"], "c4:de");
    }
}
