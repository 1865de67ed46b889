//! Query Service
//!
//! Validates pagination, hands filters to the store unchanged, and shapes store
//! results into wire envelopes. No caching: every call reads the store.

use mi_common::{MessagePage, MessageView, Stats};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::{self, MessageFilter, Page, PageError, DEFAULT_PAGE_LIMIT};

/// Query string of `GET /messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesParams {
    /// Page size, 1..=100 (default 50).
    pub limit: Option<i64>,
    /// Rows to skip, >= 0 (default 0).
    pub offset: Option<i64>,
    /// Exact sender match.
    pub from: Option<String>,
    /// Inclusive lower bound on `ts`.
    pub since: Option<String>,
    /// Case-sensitive substring of `text`.
    pub q: Option<String>,
}

impl ListMessagesParams {
    pub fn page(&self) -> Result<Page, PageError> {
        Page::new(
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            self.offset.unwrap_or(0),
        )
    }

    pub fn filter(&self) -> MessageFilter {
        let mut filter = MessageFilter::new();
        if let Some(from) = &self.from {
            filter = filter.from_msisdn(from.as_str());
        }
        if let Some(since) = &self.since {
            filter = filter.since(since.as_str());
        }
        if let Some(q) = &self.q {
            filter = filter.text_contains(q.as_str());
        }
        filter
    }
}

/// Query errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Caller supplied an unusable parameter.
    #[error("{0}")]
    InvalidParameter(String),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl From<PageError> for QueryError {
    fn from(err: PageError) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}

/// List one page of messages.
pub async fn list_messages(
    pool: &SqlitePool,
    params: &ListMessagesParams,
) -> Result<MessagePage, QueryError> {
    let page = params.page()?;
    let (messages, total) = db::list_messages(pool, &params.filter(), page).await?;

    Ok(MessagePage {
        data: messages.into_iter().map(MessageView::from).collect(),
        total,
        limit: page.limit(),
        offset: page.offset(),
    })
}

/// Aggregate statistics.
pub async fn stats(pool: &SqlitePool) -> Result<Stats, QueryError> {
    let stats = db::message_stats(pool).await?;

    Ok(Stats {
        total_messages: stats.total_messages,
        senders_count: stats.distinct_senders,
        messages_per_sender: stats.top_senders.into_iter().map(Into::into).collect(),
        first_message_ts: stats.first_ts,
        last_message_ts: stats.last_ts,
    })
}
