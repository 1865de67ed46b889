//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router. Every `TestApp` owns a fresh `SQLite` file in a temporary directory,
//! so tests never share rows and can run in parallel.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mi_server::api::{create_router, AppState};
use mi_server::config::Config;
use mi_server::db;
use mi_server::ingest::signing::sign_payload;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Secret configured for every test app unless overridden.
pub const TEST_SECRET: &str = "testsecret";

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test app with the default test config.
    pub async fn new() -> Self {
        Self::with_config(Config::default_for_test()).await
    }

    /// Create a test app with a custom config. `database_url` is replaced.
    pub async fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        config.database_url = format!("sqlite://{}", dir.path().join("app.db").display());

        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to open test DB");
        db::init_schema(&pool).await.expect("Failed to apply schema");

        let state = AppState::new(pool.clone(), config.clone());
        let router = create_router(state);

        Self {
            router,
            pool,
            config: Arc::new(config),
            _dir: dir,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// GET `uri` with no body.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        let req = Self::request(Method::GET, uri)
            .body(Body::empty())
            .unwrap();
        self.oneshot(req).await
    }

    /// POST raw bytes to `/webhook` with an optional `X-Signature` header.
    pub async fn post_webhook_raw(&self, body: &[u8], signature: Option<&str>) -> Response<Body> {
        let mut req = Self::request(Method::POST, "/webhook")
            .header("Content-Type", "application/json");
        if let Some(sig) = signature {
            req = req.header("X-Signature", sig);
        }
        self.oneshot(req.body(Body::from(body.to_vec())).unwrap())
            .await
    }

    /// POST a JSON payload to `/webhook`, correctly signed with [`TEST_SECRET`].
    pub async fn post_signed(&self, payload: &Value) -> Response<Body> {
        let body = serde_json::to_vec(payload).unwrap();
        let sig = sign_payload(TEST_SECRET, &body);
        self.post_webhook_raw(&body, Some(&sig)).await
    }

    /// Insert a message through the webhook and assert it was accepted.
    pub async fn seed(&self, id: &str, from: &str, ts: &str, text: Option<&str>) {
        let resp = self.post_signed(&message(id, from, ts, text)).await;
        assert_eq!(resp.status(), 200, "Seeding {id} failed");
    }

    /// Number of stored rows.
    pub async fn row_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await
            .expect("Count failed")
    }
}

/// Build a webhook payload.
pub fn message(id: &str, from: &str, ts: &str, text: Option<&str>) -> Value {
    let mut payload = json!({
        "message_id": id,
        "from": from,
        "to": "+14155550200",
        "ts": ts,
    });
    if let Some(text) = text {
        payload["text"] = json!(text);
    }
    payload
}

/// Read a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// Read a response body as UTF-8 text.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Extract `data[].message_id` from a `/messages` response body.
pub fn ids(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|m| m["message_id"].as_str().unwrap().to_owned())
        .collect()
}
