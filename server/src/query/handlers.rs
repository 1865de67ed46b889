//! Query Handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mi_common::{ErrorBody, MessagePage, Stats};

use super::service::{self, ListMessagesParams, QueryError};
use crate::api::AppState;

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidParameter(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::new(detail))).into_response()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new("internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// List stored messages with pagination and filters.
/// GET /messages?limit=&offset=&from=&since=&q=
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListMessagesParams>, QueryRejection>,
) -> Result<Json<MessagePage>, QueryError> {
    let Query(params) = params.map_err(|e| QueryError::InvalidParameter(e.body_text()))?;
    let page = service::list_messages(&state.db, &params).await?;
    Ok(Json(page))
}

/// Message statistics.
/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, QueryError> {
    Ok(Json(service::stats(&state.db).await?))
}
