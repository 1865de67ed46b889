//! Database Layer
//!
//! `SQLite` message store. The `messages` table is keyed by `message_id`; the
//! primary key is the only mechanism that keeps concurrent ingestion of the
//! same id down to a single row.

mod filter;
mod models;
mod queries;


use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
pub use filter::*;
pub use models::*;
pub use queries::*;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Schema statements, applied in order. Every statement is idempotent.
const SCHEMA: [&str; 3] = [
    r"CREATE TABLE IF NOT EXISTS messages (
        message_id TEXT PRIMARY KEY,
        from_msisdn TEXT NOT NULL,
        to_msisdn TEXT NOT NULL,
        ts TEXT NOT NULL,
        text TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_ts_message_id ON messages (ts, message_id)",
    "CREATE INDEX IF NOT EXISTS idx_messages_from_msisdn ON messages (from_msisdn)",
];

/// Create `SQLite` connection pool.
///
/// The parent directory of the database file is created when missing.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL: {database_url}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Writers wait on each other instead of failing with SQLITE_BUSY
        .busy_timeout(Duration::from_secs(5));

    ensure_parent_dir(options.get_filename()).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        // Prevent hanging requests on pool exhaustion
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect_with(options)
        .await
        .context("failed to open SQLite database")?;

    info!("Connected to SQLite");
    Ok(pool)
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if path.as_os_str() == ":memory:" {
        return Ok(());
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create database directory {}", dir.display()))?;
    }
    Ok(())
}

/// Apply the message schema.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to apply schema")?;
    }
    info!("Database schema ready");
    Ok(())
}

/// Check that the store answers and the `messages` table exists.
pub async fn is_ready(pool: &SqlitePool) -> bool {
    let found: Result<Option<String>, sqlx::Error> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
    )
    .fetch_optional(pool)
    .await;

    match found {
        Ok(name) => name.is_some(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness query failed");
            false
        }
    }
}
