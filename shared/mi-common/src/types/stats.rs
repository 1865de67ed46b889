//! Statistics Types

use serde::{Deserialize, Serialize};

/// Message count for a single sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderCount {
    pub from: String,
    pub count: i64,
}

/// Aggregate statistics over the whole message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Total stored messages.
    pub total_messages: i64,
    /// Number of distinct senders.
    pub senders_count: i64,
    /// Top senders (at most 10) by descending count.
    pub messages_per_sender: Vec<SenderCount>,
    /// Earliest `ts`, `None` when the store is empty.
    pub first_message_ts: Option<String>,
    /// Latest `ts`, `None` when the store is empty.
    pub last_message_ts: Option<String>,
}
