//! Cross-cutting behaviour of the router: caller tiers, rate limiting, request ids, health
//! and metrics.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use serial_test::serial;
use server::middleware::X_REQUEST_ID;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower::ServiceExt;

use crate::mock_infrastructure::{
    block_fixture, get, hex64, post_json, test_app, test_state, UpstreamMock,
};

#[tokio::test]
async fn test_pro_key_raises_array_limit() {
    let mut upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.limits.freemium_array_size = 1;
    config.limits.pro_array_size = 3;
    config.limits.pro_api_keys = vec!["pro-key".to_string()];
    let hashes: Vec<String> = (1..=2).map(hex64).collect();
    for (height, hash) in (1u64..).zip(&hashes) {
        upstream.mock_block(hash, block_fixture(hash, height)).await;
    }
    let app = test_app(test_state(&config));
    let body = json!({"hashes": hashes});

    let (status, response) = post_json(&app, "/block/detailsByHash", &body, &[]).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response, json!({"error": "Array too large. Max 1 hashes"}));

    let (status, _) =
        post_json(&app, "/block/detailsByHash", &body, &[("x-api-key", "wrong-key")]).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, response) =
        post_json(&app, "/block/detailsByHash", &body, &[("x-api-key", "pro-key")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_slp_routes_are_rate_limited() {
    let upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.rate_limit.max_tokens = 2;
    let app = test_app(test_state(&config));

    for _ in 0..2 {
        let (status, _) = get(&app, "/slp/").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/slp/").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"error": "Too many requests. Limits are 60 requests per minute."}));

    // Other families are not limited.
    let (status, _) = get(&app, "/block/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_buckets_per_client_ip() {
    let upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.rate_limit.max_tokens = 1;
    let app = test_app(test_state(&config));

    let request_from = |ip: Ipv4Addr| {
        Request::builder()
            .uri("/slp/")
            .extension(ConnectInfo(SocketAddr::new(IpAddr::V4(ip), 40_000)))
            .body(Body::empty())
            .unwrap()
    };
    let first = Ipv4Addr::new(10, 0, 0, 1);
    let second = Ipv4Addr::new(10, 0, 0, 2);

    let response = app.clone().oneshot(request_from(first)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(request_from(second)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(request_from(first)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_can_be_disabled() {
    let upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.rate_limit.enabled = false;
    config.rate_limit.max_tokens = 1;
    let app = test_app(test_state(&config));

    for _ in 0..5 {
        let (status, _) = get(&app, "/slp/").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    let request = Request::builder()
        .uri("/block/detailsByHash/")
        .header(X_REQUEST_ID.clone(), "trace-me")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers().get(&X_REQUEST_ID).unwrap(), "trace-me");

    let request = Request::builder().uri("/mining/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key(&X_REQUEST_ID));
}

#[tokio::test]
async fn test_health() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["network"], "mainnet");
    assert!(body["version"].is_string());
}

#[tokio::test]
#[serial]
async fn test_metrics_exposition() {
    let mut upstream = UpstreamMock::new().await;
    upstream.mock_rpc("getmininginfo", json!({"blocks": 1})).await;
    let app = test_app(test_state(&upstream.config()));

    let (status, _) = get(&app, "/mining/getMiningInfo").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/block/detailsByHash/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("chainrest_upstream_requests_total"), "{text}");
    assert!(text.contains("chainrest_failure_responses_total"), "{text}");

    // Not JSON.
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}
