//! Message Filters and Pagination
//!
//! Each optional filter maps to one bound predicate; set predicates are joined
//! with `AND`. No caller-supplied text is ever spliced into SQL.

use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Filters for listing messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    from_msisdn: Option<String>,
    since: Option<String>,
    text_contains: Option<String>,
}

impl MessageFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact match on sender.
    #[must_use]
    pub fn from_msisdn(mut self, from: impl Into<String>) -> Self {
        self.from_msisdn = non_empty(from.into());
        self
    }

    /// `ts >= since`, compared as strings.
    ///
    /// Stored timestamps are all `Z` suffixed, so lexical order matches
    /// chronological order for values written in the same form.
    #[must_use]
    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.since = non_empty(since.into());
        self
    }

    /// Case-sensitive substring match on `text`.
    #[must_use]
    pub fn text_contains(mut self, needle: impl Into<String>) -> Self {
        self.text_contains = non_empty(needle.into());
        self
    }

    /// Append the `WHERE` clause for the set filters (nothing when empty).
    pub(crate) fn push_where<'args>(&'args self, builder: &mut QueryBuilder<'args, Sqlite>) {
        let mut joiner = " WHERE ";

        if let Some(from) = &self.from_msisdn {
            builder.push(joiner).push("from_msisdn = ").push_bind(from.as_str());
            joiner = " AND ";
        }

        if let Some(since) = &self.since {
            builder.push(joiner).push("ts >= ").push_bind(since.as_str());
            joiner = " AND ";
        }

        if let Some(needle) = &self.text_contains {
            // instr() is case-sensitive and treats % and _ literally, unlike LIKE
            builder
                .push(joiner)
                .push("instr(text, ")
                .push_bind(needle.as_str())
                .push(") > 0");
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Invalid pagination input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("limit must be between 1 and {MAX_PAGE_LIMIT}, got {0}")]
    LimitOutOfRange(i64),
    #[error("offset must be 0 or greater, got {0}")]
    NegativeOffset(i64),
}

/// A validated `LIMIT`/`OFFSET` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Result<Self, PageError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(PageError::LimitOutOfRange(limit));
        }
        if offset < 0 {
            return Err(PageError::NegativeOffset(offset));
        }
        Ok(Self { limit, offset })
    }

    #[must_use]
    pub const fn limit(self) -> i64 {
        self.limit
    }

    #[must_use]
    pub const fn offset(self) -> i64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}
