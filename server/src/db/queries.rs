//! Database Queries

use chrono::{SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{InsertOutcome, Message, MessageFilter, MessageStats, NewMessage, Page, SenderTally};

/// Maximum number of senders returned by [`message_stats`].
pub const TOP_SENDERS_LIMIT: i64 = 10;

// ============================================================================
// Writes
// ============================================================================

/// Insert a message unless one with the same id already exists.
///
/// Uses `ON CONFLICT DO NOTHING` on the primary key, so two concurrent inserts
/// of one id resolve to exactly one `Created` and one `Duplicate`.
pub async fn insert_message_if_absent(
    pool: &SqlitePool,
    message: &NewMessage<'_>,
) -> sqlx::Result<InsertOutcome> {
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        r"
        INSERT INTO messages (message_id, from_msisdn, to_msisdn, ts, text, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (message_id) DO NOTHING
        ",
    )
    .bind(message.message_id)
    .bind(message.from_msisdn)
    .bind(message.to_msisdn)
    .bind(message.ts)
    .bind(message.text)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(if result.rows_affected() > 0 {
        InsertOutcome::Created
    } else {
        InsertOutcome::Duplicate
    })
}

// ============================================================================
// Reads
// ============================================================================

/// List messages matching `filter`, ordered by `(ts, message_id)`.
///
/// Returns the requested page and the number of matching rows before
/// pagination. Both reads run in one transaction so they see the same snapshot.
pub async fn list_messages(
    pool: &SqlitePool,
    filter: &MessageFilter,
    page: Page,
) -> sqlx::Result<(Vec<Message>, i64)> {
    let mut tx = pool.begin().await?;

    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM messages");
    filter.push_where(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

    let mut select: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT message_id, from_msisdn, to_msisdn, ts, text, created_at FROM messages",
    );
    filter.push_where(&mut select);
    select.push(" ORDER BY ts ASC, message_id ASC LIMIT ");
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());
    let messages = select
        .build_query_as::<Message>()
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((messages, total))
}

/// Aggregate statistics over every stored message.
///
/// Top senders are ordered by count descending, ties by sender ascending.
pub async fn message_stats(pool: &SqlitePool) -> sqlx::Result<MessageStats> {
    let mut tx = pool.begin().await?;

    let (total_messages, distinct_senders, first_ts, last_ts): (
        i64,
        i64,
        Option<String>,
        Option<String>,
    ) = sqlx::query_as(
        r"
        SELECT COUNT(*), COUNT(DISTINCT from_msisdn), MIN(ts), MAX(ts)
        FROM messages
        ",
    )
    .fetch_one(&mut *tx)
    .await?;

    let top_senders = sqlx::query_as::<_, SenderTally>(
        r"
        SELECT from_msisdn, COUNT(*) AS count
        FROM messages
        GROUP BY from_msisdn
        ORDER BY count DESC, from_msisdn ASC
        LIMIT ?
        ",
    )
    .bind(TOP_SENDERS_LIMIT)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(MessageStats {
        total_messages,
        distinct_senders,
        top_senders,
        first_ts,
        last_ts,
    })
}
