//! Webhook Handler

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mi_common::{ErrorBody, WebhookAck};

use super::pipeline::{IngestError, IngestOutcome};
use crate::api::AppState;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-signature";

impl IntoResponse for IngestOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Created(_) | Self::Duplicate(_) => {
                (StatusCode::OK, Json(WebhookAck::ok())).into_response()
            }
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("invalid signature")),
            )
                .into_response(),
            Self::ValidationFailed(reason) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::new(reason))).into_response()
            }
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        // Cause was already logged by the pipeline
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("internal server error")),
        )
            .into_response()
    }
}

/// Ingest one inbound message.
/// POST /webhook
///
/// 200 for created and duplicate alike, 401 on signature failure, 422 on an
/// invalid body.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<IngestOutcome, IngestError> {
    // A header that is not visible ASCII cannot match a hex digest
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().unwrap_or_default());

    state.pipeline.ingest(&body, signature).await
}
