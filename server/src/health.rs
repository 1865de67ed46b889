//! Liveness and Readiness Probes

use axum::{extract::State, http::StatusCode, Json};
use mi_common::HealthStatus;

use crate::{api::AppState, db};

/// Always 200 once the process is serving.
/// GET /health/live
pub async fn live() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".into(),
        reason: None,
    })
}

/// 200 only when the webhook secret is set and the store is usable.
/// GET /health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let reason = if !state.config.has_webhook_secret() {
        Some("WEBHOOK_SECRET not set")
    } else if !db::is_ready(&state.db).await {
        Some("database not ready")
    } else {
        None
    };

    match reason {
        None => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ready".into(),
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "not ready".into(),
                reason: Some(reason.into()),
            }),
        ),
    }
}
