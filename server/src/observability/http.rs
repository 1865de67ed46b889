//! Per-request access log, HTTP metrics and the Prometheus scrape endpoint.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mi_common::ErrorBody;

use super::metrics;

/// Header carrying the request id set by `SetRequestIdLayer`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log one JSON line per request and record request metrics.
///
/// The metric `path` label uses the matched route template so unknown URLs do
/// not create new series.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |m| m.as_str().to_owned());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    metrics::record_http_request(&route, status, elapsed.as_secs_f64() * 1000.0);
    tracing::info!(
        request_id,
        method = %method,
        path,
        status,
        latency_ms = elapsed.as_millis() as u64,
        "request completed"
    );

    response
}

/// Prometheus text exposition of request and webhook metrics.
/// GET /metrics
pub async fn scrape() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("internal server error")),
            )
                .into_response()
        }
    }
}
