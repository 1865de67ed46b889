//! Database Models

use mi_common::{MessageView, SenderCount};
use sqlx::FromRow;

/// Stored message row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Message {
    pub message_id: String,
    pub from_msisdn: String,
    pub to_msisdn: String,
    pub ts: String,
    pub text: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageView {
    fn from(msg: Message) -> Self {
        Self {
            message_id: msg.message_id,
            from: msg.from_msisdn,
            to: msg.to_msisdn,
            ts: msg.ts,
            text: msg.text,
        }
    }
}

/// Message fields supplied by the caller, already validated.
#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub message_id: &'a str,
    pub from_msisdn: &'a str,
    pub to_msisdn: &'a str,
    pub ts: &'a str,
    pub text: Option<&'a str>,
}

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Created,
    /// A row with the same `message_id` already existed; nothing changed.
    Duplicate,
}

impl InsertOutcome {
    #[must_use]
    pub const fn is_duplicate(self) -> bool {
        matches!(self, Self::Duplicate)
    }
}

/// Per-sender message count.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SenderTally {
    pub from_msisdn: String,
    pub count: i64,
}

impl From<SenderTally> for SenderCount {
    fn from(tally: SenderTally) -> Self {
        Self {
            from: tally.from_msisdn,
            count: tally.count,
        }
    }
}

/// Aggregates over the whole store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStats {
    pub total_messages: i64,
    pub distinct_senders: i64,
    /// At most [`TOP_SENDERS_LIMIT`](super::TOP_SENDERS_LIMIT) entries.
    pub top_senders: Vec<SenderTally>,
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}
