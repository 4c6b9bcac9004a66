//! Tests for the Opensea client against a local scripted server.

mod test_utils;

use blockso_error::OpenseaErrorKind;
use blockso_opensea::OpenseaClient;
use blockso_rate_limit::{
    ApiConfig, RetryingDispatcher, ThrottleKind, ThrottledDispatcher, TokenBucket,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_utils::{MockReply, MockServer, client_for, roomy_bucket};
use tokio_util::sync::CancellationToken;

const CONTRACT: &str = "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb";

fn asset_json() -> String {
    serde_json::json!({
        "id": 1234,
        "token_id": "7",
        "name": "Punk #7",
        "image_url": "https://img.example/full.png",
        "image_thumbnail_url": "https://img.example/thumb.png",
        "permalink": "https://opensea.io/assets/0xb47e/7",
        "traits": []
    })
    .to_string()
}

#[tokio::test]
async fn test_get_asset_decodes_body() {
    let server = MockServer::start([MockReply::json(200, &asset_json())]).await;
    let client = client_for(&server, None, roomy_bucket());

    let asset = client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(asset.name().as_deref(), Some("Punk #7"));
    assert_eq!(asset.token_id().as_deref(), Some("7"));
    assert_eq!(
        asset.image_thumbnail_url().as_deref(),
        Some("https://img.example/thumb.png")
    );
    assert_eq!(asset.image_url().as_deref(), Some("https://img.example/full.png"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with(&format!("GET /api/v1/asset/{}/7/ HTTP/1.1", CONTRACT)));
}

#[tokio::test]
async fn test_throttled_responses_are_retried() {
    let server = MockServer::start([
        MockReply::throttled("0"),
        MockReply::throttled("0"),
        MockReply::json(200, &asset_json()),
    ])
    .await;
    let client = client_for(&server, None, roomy_bucket());

    let asset = client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(asset.name().as_deref(), Some("Punk #7"));
    assert_eq!(server.request_count(), 3);
}

#[tokio::test]
async fn test_throttled_response_waits_retry_after() {
    let server = MockServer::start([
        MockReply::throttled("1"),
        MockReply::json(200, &asset_json()),
    ])
    .await;
    // Fallback is 10ms, so only the header can account for a one second wait
    let client = client_for(&server, None, roomy_bucket());
    let start = Instant::now();

    let asset = client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert_eq!(asset.name().as_deref(), Some("Punk #7"));
    assert_eq!(server.request_count(), 2);
    assert!(elapsed >= Duration::from_secs(1), "retried after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "retried after {:?}", elapsed);
}

#[tokio::test]
async fn test_throttled_without_header_uses_fallback() {
    let server = MockServer::start([
        MockReply::status(429, ""),
        MockReply::json(200, &asset_json()),
    ])
    .await;
    let client = client_for(&server, None, roomy_bucket());

    let response = client
        .get_asset_response(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_error_status_is_not_retried() {
    let server = MockServer::start([MockReply::status(404, "not found")]).await;
    let client = client_for(&server, None, roomy_bucket());

    let err = client
        .get_asset(CONTRACT, "999", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.kind(),
        &OpenseaErrorKind::Status {
            status_code: 404,
            message: "not found".to_string()
        }
    );
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_raw_response_passes_through_error_status() {
    let server = MockServer::start([MockReply::status(500, "")]).await;
    let client = client_for(&server, None, roomy_bucket());

    let response = client
        .get_asset_response(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn test_invalid_body_is_a_parse_error() {
    let server = MockServer::start([MockReply::json(200, "not json")]).await;
    let client = client_for(&server, None, roomy_bucket());

    let err = client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), OpenseaErrorKind::Parse(_)));
}

#[tokio::test]
async fn test_cancel_in_flight_request() {
    let server = MockServer::start([MockReply::Hang]).await;
    let client = client_for(&server, None, roomy_bucket());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = client.get_asset(CONTRACT, "7", &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(server.request_count(), 1, "cancellation is not retried");
}

#[tokio::test]
async fn test_cancel_before_start_sends_nothing() {
    let server = MockServer::start([]).await;
    let client = client_for(&server, None, roomy_bucket());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client
        .get_asset_response(CONTRACT, "7", &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    // Bind and drop a listener so the port is closed
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let dispatcher = ThrottledDispatcher::new(Arc::new(roomy_bucket()), RetryingDispatcher::new());
    let client = OpenseaClient::with_dispatcher(
        http,
        &format!("http://{}/api/v1", addr),
        None,
        dispatcher,
    );

    let err = client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), OpenseaErrorKind::Request(_)));
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start([MockReply::json(200, &asset_json())]).await;
    let client = client_for(&server, Some("secret-key"), roomy_bucket());

    client
        .get_asset(CONTRACT, "7", &CancellationToken::new())
        .await
        .unwrap();

    let request = server.requests()[0].to_ascii_lowercase();
    assert!(request.contains("x-api-key: secret-key"), "request was {}", request);
}

#[tokio::test]
async fn test_shared_bucket_spaces_requests() {
    let window = Duration::from_millis(300);
    let server = MockServer::start([]).await;
    let client = client_for(&server, None, TokenBucket::new(1, window).unwrap());
    let cancel = CancellationToken::new();

    let start = Instant::now();
    client.get_asset(CONTRACT, "1", &cancel).await.unwrap();
    client.get_asset(CONTRACT, "2", &cancel).await.unwrap();

    assert!(start.elapsed() >= window, "second request waited for the next window");
    assert_eq!(server.request_count(), 2);
}

#[test]
fn test_asset_url_trims_trailing_slash() {
    let config = ApiConfig {
        base_url: "https://api.opensea.io/api/v1/".to_string(),
        max_requests: 4,
        window_ms: 1000,
        throttle: ThrottleKind::Gcra,
        fallback_retry_after_secs: 1,
        max_retries: Some(3),
    };
    let client = OpenseaClient::new(&config, None).unwrap();

    assert_eq!(client.base_url(), "https://api.opensea.io/api/v1");
    assert_eq!(
        client.asset_url(CONTRACT, "7"),
        format!("https://api.opensea.io/api/v1/asset/{}/7/", CONTRACT)
    );
    assert_eq!(client.dispatcher().dispatcher().max_retries(), Some(3));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ApiConfig {
        base_url: "https://api.opensea.io/api/v1".to_string(),
        max_requests: 0,
        window_ms: 1000,
        throttle: ThrottleKind::FixedWindow,
        fallback_retry_after_secs: 1,
        max_retries: None,
    };
    assert!(OpenseaClient::new(&config, None).is_err());
}

#[test]
fn test_invalid_section_is_named_in_error() {
    let config = ApiConfig {
        base_url: "https://testnets-api.opensea.io/api/v1".to_string(),
        max_requests: 4,
        window_ms: 0,
        throttle: ThrottleKind::FixedWindow,
        fallback_retry_after_secs: 1,
        max_retries: None,
    };

    let err = OpenseaClient::from_section("opensea_testnet", &config, None).unwrap_err();

    assert!(
        err.to_string().contains("apis.opensea_testnet.window_ms"),
        "unexpected error: {}",
        err
    );
}
