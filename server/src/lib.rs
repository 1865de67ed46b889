//! Message Ingest Server
//!
//! Accepts HMAC-signed inbound messages over a webhook, stores them
//! idempotently in `SQLite`, and serves paginated queries and statistics.

pub mod api;
pub mod config;
pub mod db;
pub mod health;
pub mod ingest;
pub mod observability;
pub mod query;
