//! HTTP integration tests for `GET /messages`.
//!
//! Run with: `cargo test --test messages_http_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{body_to_json, ids, TestApp};

#[tokio::test]
async fn test_empty_store_returns_empty_page() {
    let app = TestApp::new().await;
    let resp = app.get("/messages").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let page = body_to_json(resp).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 0);
    assert_eq!(page["total"], 0);
    assert_eq!(page["limit"], 50);
    assert_eq!(page["offset"], 0);
}

#[tokio::test]
async fn test_ordering_by_ts_then_message_id() {
    let app = TestApp::new().await;
    app.seed("m2", "+14155550100", "2025-01-15T10:00:00Z", None).await;
    app.seed("m1", "+14155550100", "2025-01-15T10:00:00Z", None).await;
    app.seed("m3", "+14155550100", "2025-01-15T09:00:00Z", None).await;

    let page = body_to_json(app.get("/messages").await).await;
    assert_eq!(ids(&page), ["m3", "m1", "m2"]);
}

#[tokio::test]
async fn test_projection_exposes_only_wire_fields() {
    let app = TestApp::new().await;
    app.seed("m1", "+14155550100", "2025-01-15T10:00:00Z", Some("Hi"))
        .await;
    app.seed("m2", "+14155550100", "2025-01-15T11:00:00Z", None).await;

    let page = body_to_json(app.get("/messages").await).await;
    let first = page["data"][0].as_object().unwrap();
    let mut keys: Vec<_> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["from", "message_id", "text", "to", "ts"]);
    assert_eq!(first["to"], "+14155550200");
    assert_eq!(first["ts"], "2025-01-15T10:00:00Z");
    assert!(page["data"][1]["text"].is_null());
}

#[tokio::test]
async fn test_pagination_reports_total_before_paging() {
    let app = TestApp::new().await;
    for i in 0..5 {
        let ts = format!("2025-01-15T10:0{i}:00Z");
        app.seed(&format!("m{i}"), "+14155550100", &ts, None).await;
    }

    let page = body_to_json(app.get("/messages?limit=2&offset=1").await).await;
    assert_eq!(ids(&page), ["m1", "m2"]);
    assert_eq!(page["total"], 5);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 1);

    let page = body_to_json(app.get("/messages?limit=2&offset=10").await).await;
    assert!(ids(&page).is_empty());
    assert_eq!(page["total"], 5);
}

#[tokio::test]
async fn test_limit_bounds_are_inclusive() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/messages?limit=1").await.status(), StatusCode::OK);
    assert_eq!(app.get("/messages?limit=100").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_out_of_range_parameters_are_rejected() {
    let app = TestApp::new().await;

    for uri in [
        "/messages?limit=0",
        "/messages?limit=101",
        "/messages?limit=-5",
        "/messages?offset=-1",
        "/messages?limit=abc",
        "/messages?offset=1.5",
    ] {
        let resp = app.get(uri).await;
        assert_eq!(
            resp.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{uri} should be rejected"
        );
        let json = body_to_json(resp).await;
        assert!(json["detail"].is_string());
    }
}

#[tokio::test]
async fn test_filters_intersect() {
    let app = TestApp::new().await;
    app.seed("a1", "+111", "2025-01-15T09:00:00Z", Some("hello world"))
        .await;
    app.seed("a2", "+111", "2025-01-15T11:00:00Z", Some("hello again"))
        .await;
    app.seed("a3", "+111", "2025-01-15T12:00:00Z", Some("goodbye"))
        .await;
    app.seed("b1", "+222", "2025-01-15T11:00:00Z", Some("hello there"))
        .await;

    let page = body_to_json(app.get("/messages?from=%2B111").await).await;
    assert_eq!(ids(&page), ["a1", "a2", "a3"]);

    let page = body_to_json(app.get("/messages?since=2025-01-15T11:00:00Z").await).await;
    assert_eq!(ids(&page), ["a2", "b1", "a3"]);

    let page = body_to_json(app.get("/messages?q=hello").await).await;
    assert_eq!(ids(&page), ["a1", "a2", "b1"]);

    let page = body_to_json(
        app.get("/messages?from=%2B111&since=2025-01-15T10:00:00Z&q=hello")
            .await,
    )
    .await;
    assert_eq!(ids(&page), ["a2"]);
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_text_search_is_case_sensitive_and_literal() {
    let app = TestApp::new().await;
    app.seed("m1", "+111", "2025-01-15T09:00:00Z", Some("Hello")).await;
    app.seed("m2", "+111", "2025-01-15T10:00:00Z", Some("100% sure"))
        .await;
    app.seed("m3", "+111", "2025-01-15T11:00:00Z", None).await;

    let page = body_to_json(app.get("/messages?q=hello").await).await;
    assert!(ids(&page).is_empty());

    let page = body_to_json(app.get("/messages?q=Hello").await).await;
    assert_eq!(ids(&page), ["m1"]);

    // `%` is not a wildcard
    let page = body_to_json(app.get("/messages?q=%25").await).await;
    assert_eq!(ids(&page), ["m2"]);
}

#[tokio::test]
async fn test_empty_filter_values_are_ignored() {
    let app = TestApp::new().await;
    app.seed("m1", "+111", "2025-01-15T09:00:00Z", None).await;
    app.seed("m2", "+222", "2025-01-15T10:00:00Z", Some("x")).await;

    let page = body_to_json(app.get("/messages?from=&since=&q=").await).await;
    assert_eq!(ids(&page), ["m1", "m2"]);
}
