//! Webhook Ingestion Pipeline
//!
//! verify signature → parse and validate → idempotent insert. Every request
//! ends in exactly one classified outcome, and each outcome is logged and
//! counted once.

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;
use thiserror::Error;

use super::signing::verify_signature;
use super::validation::parse_and_validate;
use crate::config::Config;
use crate::db::{self, InsertOutcome};
use crate::observability::metrics;

/// Terminal outcome of one webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Signature missing, empty, or wrong; or no secret configured.
    Unauthorized,
    /// Body is malformed or a field breaks its contract.
    ValidationFailed(String),
    /// New message stored.
    Created(String),
    /// Message id already stored; nothing changed.
    Duplicate(String),
}

impl IngestOutcome {
    /// Classification label used in logs and metrics.
    pub const fn result(&self) -> &'static str {
        match self {
            Self::Unauthorized => "invalid_signature",
            Self::ValidationFailed(_) => "validation_error",
            Self::Created(_) => "created",
            Self::Duplicate(_) => "duplicate",
        }
    }

    /// Created and duplicate submissions are both successful.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Duplicate(_))
    }
}

/// Failures that are not the caller's fault.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

/// Orchestrates a single webhook submission.
#[derive(Clone)]
pub struct IngestPipeline {
    db: SqlitePool,
    config: Arc<Config>,
}

impl IngestPipeline {
    #[must_use]
    pub const fn new(db: SqlitePool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Run the pipeline over the raw request body and signature header.
    #[tracing::instrument(skip_all, fields(body_len = body.len()))]
    pub async fn ingest(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        let started = Instant::now();

        if !verify_signature(body, signature, self.config.webhook_secret()) {
            let outcome = IngestOutcome::Unauthorized;
            let latency_ms = elapsed_ms(started);
            metrics::record_webhook_outcome(outcome.result(), latency_ms);
            tracing::warn!(result = outcome.result(), latency_ms, "Invalid signature");
            return Ok(outcome);
        }

        let message = match parse_and_validate(body) {
            Ok(message) => message,
            Err(e) => {
                let outcome = IngestOutcome::ValidationFailed(e.to_string());
                let latency_ms = elapsed_ms(started);
                metrics::record_webhook_outcome(outcome.result(), latency_ms);
                tracing::warn!(
                    result = outcome.result(),
                    message_id = e.message_id().unwrap_or("unknown"),
                    latency_ms,
                    reason = %e,
                    "Validation error"
                );
                return Ok(outcome);
            }
        };

        let inserted = match db::insert_message_if_absent(&self.db, &message.as_new_message()).await
        {
            Ok(inserted) => inserted,
            Err(e) => {
                let latency_ms = elapsed_ms(started);
                metrics::record_webhook_outcome("storage_error", latency_ms);
                tracing::error!(
                    result = "storage_error",
                    message_id = message.message_id(),
                    latency_ms,
                    error = %e,
                    "Failed to store message"
                );
                return Err(IngestError::Storage(e));
            }
        };

        let message_id = message.message_id().to_owned();
        let outcome = match inserted {
            InsertOutcome::Created => IngestOutcome::Created(message_id),
            InsertOutcome::Duplicate => IngestOutcome::Duplicate(message_id),
        };

        let latency_ms = elapsed_ms(started);
        metrics::record_webhook_outcome(outcome.result(), latency_ms);
        tracing::info!(
            result = outcome.result(),
            message_id = message.message_id(),
            dup = inserted.is_duplicate(),
            latency_ms,
            "Webhook processed"
        );

        Ok(outcome)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::signing::sign_payload;
    use tempfile::TempDir;

    const SECRET: &str = "testsecret";

    async fn setup(secret: Option<&str>) -> (IngestPipeline, SqlitePool, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ingest.db").display());
        let pool = db::create_pool(&url).await.unwrap();
        db::init_schema(&pool).await.unwrap();
        let config = Config::default_for_test().with_webhook_secret(secret);
        (
            IngestPipeline::new(pool.clone(), Arc::new(config)),
            pool,
            dir,
        )
    }

    async fn count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    const BODY: &[u8] =
        br#"{"message_id":"m1","from":"+14155550100","to":"+14155550200","ts":"2025-01-15T10:00:00Z","text":"Hello"}"#;

    #[tokio::test]
    async fn created_then_duplicate() {
        let (pipeline, pool, _dir) = setup(Some(SECRET)).await;
        let sig = sign_payload(SECRET, BODY);

        let first = pipeline.ingest(BODY, Some(&sig)).await.unwrap();
        assert_eq!(first, IngestOutcome::Created("m1".into()));
        assert!(first.is_accepted());

        let second = pipeline.ingest(BODY, Some(&sig)).await.unwrap();
        assert_eq!(second, IngestOutcome::Duplicate("m1".into()));
        assert!(second.is_accepted());
        assert_eq!(second.result(), "duplicate");

        assert_eq!(count(&pool).await, 1);
    }

    #[tokio::test]
    async fn bad_signature_never_touches_store() {
        let (pipeline, pool, _dir) = setup(Some(SECRET)).await;

        for sig in [None, Some(""), Some("123")] {
            let outcome = pipeline.ingest(BODY, sig).await.unwrap();
            assert_eq!(outcome, IngestOutcome::Unauthorized);
            assert_eq!(outcome.result(), "invalid_signature");
        }
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn signature_checked_before_parsing() {
        let (pipeline, _pool, _dir) = setup(Some(SECRET)).await;
        let outcome = pipeline.ingest(b"not json", Some("deadbeef")).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Unauthorized);
    }

    #[tokio::test]
    async fn missing_secret_rejects_everything() {
        let (pipeline, pool, _dir) = setup(None).await;
        let sig = sign_payload("", BODY);
        let outcome = pipeline.ingest(BODY, Some(&sig)).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Unauthorized);
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn invalid_payload_is_classified() {
        let (pipeline, pool, _dir) = setup(Some(SECRET)).await;
        let body = br#"{"message_id":"m1","from":"+14155550100","to":"+14155550200","ts":"2025-01-15T10:00:00+05:30"}"#;
        let sig = sign_payload(SECRET, body);

        let outcome = pipeline.ingest(body, Some(&sig)).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::ValidationFailed(_)));
        assert_eq!(outcome.result(), "validation_error");
        assert!(!outcome.is_accepted());
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn storage_failure_is_an_error() {
        let (pipeline, pool, _dir) = setup(Some(SECRET)).await;
        sqlx::query("DROP TABLE messages").execute(&pool).await.unwrap();

        let sig = sign_payload(SECRET, BODY);
        let err = pipeline.ingest(BODY, Some(&sig)).await.unwrap_err();
        assert!(matches!(err, IngestError::Storage(_)));
        assert_eq!(err.to_string(), "storage failure");
    }
}
