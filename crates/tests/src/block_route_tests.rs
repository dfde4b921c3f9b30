//! `/block` routes against a mocked indexer and full node.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use mockito::Matcher;
use serde_json::{json, Value};

use crate::mock_infrastructure::{
    block_fixture, get, hex64, post_json, post_raw, test_app, test_state, UpstreamMock,
};

#[tokio::test]
async fn test_status_routes() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    for uri in ["/block", "/block/"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "block"}));
    }
}

#[tokio::test]
async fn test_empty_hash_is_rejected() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    for uri in ["/block/detailsByHash/", "/block/detailsByHash"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({"error": "hash must not be empty"}));
    }
}

#[tokio::test]
async fn test_single_hash_returns_indexer_payload() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(0xb10c);
    let block = block_fixture(&hash, 560_000);
    let mock = upstream.mock_block(&hash, block.clone()).await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, block);
    for field in ["hash", "height", "tx", "merkleroot"] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bulk_rejects_short_hash_before_dispatch() {
    let mut upstream = UpstreamMock::new().await;
    let good = hex64(1);
    let mock = upstream
        .server
        .mock("GET", format!("/api/block/{good}").as_str())
        .expect(0)
        .create_async()
        .await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) =
        post_json(&app, "/block/detailsByHash", &json!({"hashes": [good, "abc123"]}), &[]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid hash. Double check your hash is valid: abc123"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_single_hash_with_path_characters_never_reaches_upstream() {
    let mut upstream = UpstreamMock::new().await;
    let any = upstream.server.mock("GET", Matcher::Any).expect(0).create_async().await;
    let app = test_app(test_state(&upstream.config()));

    let cases = [
        ("..%2F..%2Finternal%2Fsecret".to_string(), "../../internal/secret".to_string()),
        (format!("{}%3Fx", "0".repeat(62)), format!("{}?x", "0".repeat(62))),
        (format!("{}%23f", "0".repeat(63)), format!("{}#f", "0".repeat(63))),
    ];
    for (segment, hash) in cases {
        let uri = format!("/block/detailsByHash/{segment}");
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body,
            json!({"error": format!("Invalid hash. Double check your hash is valid: {hash}")})
        );
    }
    any.assert_async().await;
}

#[tokio::test]
async fn test_bulk_hashes_must_be_hex() {
    let mut upstream = UpstreamMock::new().await;
    let any = upstream.server.mock("GET", Matcher::Any).expect(0).create_async().await;
    let app = test_app(test_state(&upstream.config()));

    let traversal = format!("../../internal/secret{}", "?".repeat(43));
    let query = format!("{}?x", "0".repeat(62));
    let not_hex = "g".repeat(64);
    for hash in [traversal, query, not_hex] {
        assert_eq!(hash.len(), 64);
        let (status, body) = post_json(
            &app,
            "/block/detailsByHash",
            &json!({"hashes": [hex64(1), hash.clone()]}),
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": format!("Invalid hash. Double check your hash is valid: {hash}")})
        );
    }
    any.assert_async().await;
}

#[tokio::test]
async fn test_bulk_rejects_oversized_array() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));
    let hashes: Vec<String> = (0..25).map(hex64).collect();

    let (status, body) =
        post_json(&app, "/block/detailsByHash", &json!({"hashes": hashes}), &[]).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().starts_with("Array too large"));
}

#[tokio::test]
async fn test_oversize_status_is_configurable() {
    let upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.limits.oversize_status = 413;
    let app = test_app(test_state(&config));
    let heights: Vec<u64> = (0..21).collect();

    let (status, body) =
        post_json(&app, "/block/detailsByHeight", &json!({"heights": heights}), &[]).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "Array too large. Max 20 heights"}));
}

#[tokio::test]
async fn test_bulk_at_limit_preserves_order() {
    let mut upstream = UpstreamMock::new().await;
    let hashes: Vec<String> = (100..120).map(hex64).collect();
    for (height, hash) in (100u64..).zip(&hashes) {
        upstream.mock_block(hash, block_fixture(hash, height)).await;
    }
    let app = test_app(test_state(&upstream.config()));

    let (status, body) =
        post_json(&app, "/block/detailsByHash", &json!({"hashes": hashes}), &[]).await;

    assert_eq!(status, StatusCode::OK);
    let blocks = body.as_array().unwrap();
    assert_eq!(blocks.len(), 20);
    for (block, hash) in blocks.iter().zip(&hashes) {
        assert_eq!(block["hash"], json!(hash));
    }
}

#[tokio::test]
async fn test_bulk_empty_array_is_valid() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = post_json(&app, "/block/detailsByHash", &json!({"hashes": []}), &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_bulk_requires_an_array() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));
    let hash_message = json!({"error": "hashes needs to be an array. Use GET for single hash."});

    let (status, body) =
        post_json(&app, "/block/detailsByHash", &json!({"hashes": hex64(1)}), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, hash_message);

    let (status, body) = post_raw(&app, "/block/detailsByHash", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, hash_message);

    let (status, body) = post_json(&app, "/block/detailsByHeight", &json!({}), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "heights needs to be an array. Use GET for single height."}));
}

#[tokio::test]
async fn test_indexer_not_found_without_body() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(404);
    upstream.mock_indexer(&hash, 404, "").await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn test_indexer_structured_error_is_bad_request() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(7);
    upstream.mock_indexer(&hash, 500, r#"{"error":{"message":"block not indexed"}}"#).await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "block not indexed"}));
}

#[tokio::test]
async fn test_indexer_text_error_keeps_status() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(8);
    upstream.mock_indexer(&hash, 502, "Bad Gateway").await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Bad Gateway"}));
}

#[tokio::test]
async fn test_unreadable_indexer_payload_is_internal_error() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(9);
    upstream.mock_indexer(&hash, 200, "<html>maintenance</html>").await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{hash}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(message.chars().count() <= 2048 + 16);
}

#[tokio::test]
async fn test_unreachable_indexer_is_network_error() {
    let upstream = UpstreamMock::new().await;
    let mut config = upstream.config();
    config.upstreams.indexer_base_url = "http://127.0.0.1:9/api/".to_string();
    let app = test_app(test_state(&config));

    let (status, body) = get(&app, &format!("/block/detailsByHash/{}", hex64(1))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Network error: could not reach upstream"}));
}

#[tokio::test]
async fn test_single_height_resolves_through_node() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(0x5000);
    upstream.mock_rpc_with_params("getblockhash", json!([500]), json!(hash)).await;
    upstream.mock_block(&hash, block_fixture(&hash, 500)).await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, "/block/detailsByHeight/500").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["height"], 500);
    assert_eq!(body["hash"], json!(hash));
}

#[tokio::test]
async fn test_height_validation() {
    let upstream = UpstreamMock::new().await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = get(&app, "/block/detailsByHeight/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "height must not be empty"}));

    let (status, body) = get(&app, "/block/detailsByHeight/tip").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid height. Double check your height is valid: tip"}));
}

#[tokio::test]
async fn test_bulk_heights_in_order() {
    let mut upstream = UpstreamMock::new().await;
    for height in [3u64, 1, 2] {
        let hash = hex64(height);
        upstream.mock_rpc_with_params("getblockhash", json!([height]), json!(hash)).await;
        upstream.mock_block(&hash, block_fixture(&hash, height)).await;
    }
    let app = test_app(test_state(&upstream.config()));

    let (status, body) =
        post_json(&app, "/block/detailsByHeight", &json!({"heights": [3, "1", 2]}), &[]).await;

    assert_eq!(status, StatusCode::OK);
    let heights: Vec<Value> = body.as_array().unwrap().iter().map(|b| b["height"].clone()).collect();
    assert_eq!(heights, vec![json!(3), json!(1), json!(2)]);
}

#[tokio::test]
async fn test_bulk_heights_report_lowest_index_failure() {
    let mut upstream = UpstreamMock::new().await;
    let hash = hex64(1);
    upstream.mock_rpc_with_params("getblockhash", json!([1]), json!(hash)).await;
    upstream.mock_block(&hash, block_fixture(&hash, 1)).await;
    upstream
        .mock_rpc_error_with_params("getblockhash", json!([900_000]), -8, "Block height out of range")
        .await;
    upstream
        .mock_rpc_error_with_params("getblockhash", json!([900_001]), -1, "second failure")
        .await;
    let app = test_app(test_state(&upstream.config()));

    let (status, body) = post_json(
        &app,
        "/block/detailsByHeight",
        &json!({"heights": [1, 900_000, 900_001]}),
        &[],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Block height out of range"}));
}
