//! Message Ingest Common Library
//!
//! Wire types rendered by the server and consumed by clients.

pub mod types;

pub use types::*;
