//! Message Types

use serde::{Deserialize, Serialize};

/// Public projection of a stored message.
///
/// `created_at` is server bookkeeping and is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// Caller-supplied unique identifier.
    pub message_id: String,
    /// Sender MSISDN.
    pub from: String,
    /// Recipient MSISDN.
    pub to: String,
    /// Caller-supplied UTC timestamp (`Z` suffixed).
    pub ts: String,
    /// Message body, if any.
    pub text: Option<String>,
}

/// One page of messages plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    /// Messages ordered by `(ts, message_id)` ascending.
    pub data: Vec<MessageView>,
    /// Number of messages matching the filters before pagination.
    pub total: i64,
    /// Page size that was applied.
    pub limit: i64,
    /// Number of matching messages skipped.
    pub offset: i64,
}
