//! Webhook Ingestion
//!
//! Signed inbound messages are verified, validated, and stored idempotently.

pub mod handlers;
pub mod pipeline;
pub mod signing;
pub mod validation;

pub use pipeline::{IngestError, IngestOutcome, IngestPipeline};
pub use validation::{ValidMessage, ValidationError};
