use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use latcheck_client::{Client, ClientConfig};
use latcheck_common::{ErrorResponse, LatCheckError, LatencyQuery, RegionSummary, EMPTY_REGIONS_MESSAGE};
use latcheck_server::telemetry::{TelemetryRecord, TelemetrySet};
use latcheck_server::{Server, ServerConfig};

const SERVER_READY_TIMEOUT: Duration = Duration::from_secs(60);

async fn start_server(telemetry: TelemetrySet) -> Client {
    let (ready_tx, ready_rx) = oneshot::channel();

    let server = Server::new(ServerConfig {
        address: "127.0.0.1:0".parse().unwrap(),
        telemetry,
    });

    tokio::spawn(async move {
        server.run(ready_tx).await.expect("server failed");
    });

    let addr = timeout(SERVER_READY_TIMEOUT, ready_rx)
        .await
        .expect("server did not start within 60 seconds")
        .expect("server ready signal dropped");

    Client::new(ClientConfig { address: addr.to_string() })
}

fn two_apac_records() -> TelemetrySet {
    TelemetrySet::new(vec![
        TelemetryRecord::new("apac", 100.0, 99.0),
        TelemetryRecord::new("apac", 200.0, 97.0),
    ])
}

#[tokio::test]
async fn test_two_sample_region_summary() {
    let client = start_server(two_apac_records()).await;

    let report = client.check_regions(["apac"], 150.0).await.expect("check failed");

    assert_eq!(
        report.regions["apac"],
        RegionSummary {
            avg_latency: Some(150.0),
            p95_latency: Some(200.0),
            avg_uptime: Some(98.0),
            breaches: 1,
            samples: 2,
        }
    );
}

#[tokio::test]
async fn test_embedded_sample_is_served() {
    let client = start_server(TelemetrySet::embedded_sample()).await;

    let report = client.check_regions(["apac", "emea"], 172.0).await.expect("check failed");

    assert_eq!(report.regions.len(), 2);
    assert_eq!(report.regions["apac"].samples, 3);
    assert_eq!(report.regions["apac"].breaches, 0);
    assert_eq!(report.regions["emea"].samples, 3);
    assert_eq!(report.regions["emea"].breaches, 2);
    assert_eq!(report.regions["emea"].p95_latency, Some(200.0));
}

#[tokio::test]
async fn test_unknown_region_still_reported() {
    let client = start_server(two_apac_records()).await;

    let report = client.check_regions(["apac", "latam"], 150.0).await.expect("check failed");

    assert_eq!(report.regions["latam"], RegionSummary::default());
    assert_eq!(report.regions["apac"].samples, 2);
}

#[tokio::test]
async fn test_region_match_ignores_case() {
    let client = start_server(two_apac_records()).await;

    let report = client.check_regions(["ApAc"], 150.0).await.expect("check failed");

    assert_eq!(report.regions["ApAc"].samples, 2);
}

#[tokio::test]
async fn test_concurrent_requests_share_telemetry() {
    let client = std::sync::Arc::new(start_server(TelemetrySet::embedded_sample()).await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                let region = if i % 2 == 0 { "apac" } else { "emea" };
                client.check_regions([region], 150.0).await.map(|r| r.regions[region].samples)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(3));
    }
}

// --- Errors (via raw reqwest to bypass client-side validation) ---

#[tokio::test]
async fn test_empty_regions_returns_400_with_message() {
    let client = start_server(two_apac_records()).await;
    let http = reqwest::Client::new();

    let response = http
        .post(client.build_check_url())
        .json(&LatencyQuery::new(Vec::<String>::new(), 150.0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, EMPTY_REGIONS_MESSAGE);
}

#[tokio::test]
async fn test_client_rejects_empty_regions() {
    let client = start_server(two_apac_records()).await;

    let result = client.check_regions(Vec::<String>::new(), 150.0).await;

    assert!(matches!(result, Err(LatCheckError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_missing_threshold_returns_422() {
    let client = start_server(two_apac_records()).await;
    let http = reqwest::Client::new();

    let response = http
        .post(client.build_check_url())
        .json(&serde_json::json!({"regions": ["apac"]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let client = start_server(two_apac_records()).await;
    let http = reqwest::Client::new();

    let response = http
        .post(client.build_check_url())
        .header("X-Request-Id", "trace-me")
        .json(&LatencyQuery::new(["apac"], 150.0))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me");
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let client = start_server(two_apac_records()).await;
    let http = reqwest::Client::new();

    let response = http
        .request(reqwest::Method::OPTIONS, client.build_check_url())
        .header("Origin", "https://dashboard.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
}
