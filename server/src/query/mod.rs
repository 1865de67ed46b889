//! Message Queries and Statistics

pub mod handlers;
pub mod service;

pub use service::{ListMessagesParams, QueryError};
