//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use axum::http::HeaderName;
use sqlx::SqlitePool;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::{
    config::Config,
    health, ingest,
    ingest::IngestPipeline,
    observability::http::{scrape, track_requests, REQUEST_ID_HEADER},
    query,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Webhook ingestion pipeline
    pub pipeline: IngestPipeline,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            pipeline: IngestPipeline::new(db.clone(), config.clone()),
            db,
            config,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/webhook", post(ingest::handlers::receive))
        .route("/messages", get(query::handlers::list))
        .route("/stats", get(query::handlers::stats))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(scrape))
        // Layers run bottom-up: the id is set before the access log reads it
        .layer(from_fn(track_requests))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
