//! Dashboard statistics.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::alert_log::count_since;
use crate::error::Result;
use crate::models::DashboardStats;

/// Headline counts: recipients, regions, and alerts in the last 24 hours.
pub async fn dashboard_stats(pool: &SqlitePool) -> Result<DashboardStats> {
    let total_recipients = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipients")
        .fetch_one(pool)
        .await?;
    let total_regions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM regions")
        .fetch_one(pool)
        .await?;
    let alerts_sent_24h = count_since(pool, Utc::now() - Duration::hours(24)).await?;

    Ok(DashboardStats {
        total_recipients,
        total_regions,
        alerts_sent_24h,
    })
}
