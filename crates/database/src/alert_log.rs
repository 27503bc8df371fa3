//! Broadcast audit trail. Append-only.

use chrono::{DateTime, Utc};
use flood_core::AlertLogEntry;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{format_time, AlertLogRow, AlertRecord};

/// Default page size for alert history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Append a log entry and return its ID.
pub async fn append_entry(pool: &SqlitePool, entry: &AlertLogEntry) -> Result<i64> {
    let per_channel = serde_json::to_string(&entry.per_channel)
        .map_err(|e| DatabaseError::corrupt("alert_log", e))?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO alert_log
            (region_id, message, risk_level, attempted_count, succeeded_count, per_channel,
             issued_by, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(entry.region_id)
    .bind(&entry.message)
    .bind(entry.risk_level.as_str())
    .bind(i64::from(entry.attempted_count))
    .bind(i64::from(entry.succeeded_count))
    .bind(per_channel)
    .bind(&entry.issued_by)
    .bind(format_time(entry.created_at))
    .fetch_one(pool)
    .await?;

    tracing::debug!(alert_id = id, region_id = entry.region_id, "Appended alert log entry");
    Ok(id)
}

/// The newest entries, newest first.
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AlertRecord>> {
    let rows = sqlx::query_as::<_, AlertLogRow>(
        r#"
        SELECT id, region_id, message, risk_level, attempted_count, succeeded_count,
               per_channel, issued_by, created_at
        FROM alert_log
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AlertRecord::try_from).collect()
}

/// Number of entries logged at or after `since`.
pub async fn count_since(pool: &SqlitePool, since: DateTime<Utc>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM alert_log
        WHERE created_at >= ?
        "#,
    )
    .bind(format_time(since))
    .fetch_one(pool)
    .await?;

    Ok(count)
}
