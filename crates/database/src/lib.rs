//! SQLite persistence layer for FloodWatch.
//!
//! This crate provides async database operations for the region and
//! recipient directory, the append-only risk assessment history, and the
//! broadcast audit log, using SQLx with SQLite.
//!
//! [`Database`] also implements the pipeline's collaborator traits
//! ([`AssessmentStore`](flood_core::AssessmentStore),
//! [`AlertLog`](flood_core::AlertLog) and
//! [`RecipientResolver`](flood_core::RecipientResolver)).
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::NewRegion, region};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:floodwatch.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a region
//!     let kamrup = NewRegion {
//!         name: "Kamrup Metro".to_string(),
//!         state: Some("Assam".to_string()),
//!         latitude: 26.14,
//!         longitude: 91.73,
//!         station_id: Some("BRH-042".to_string()),
//!         population: None,
//!     };
//!     region::create_region(db.pool(), &kamrup).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod alert_log;
pub mod assessment;
pub mod error;
pub mod models;
pub mod recipient;
pub mod region;
pub mod stats;
mod store;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    AlertRecord, DashboardStats, NewRecipient, NewRegion, RecipientRecord, Region, RegionSummary,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/floodwatch.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing; use a single connection)
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use flood_core::{
        AlertLog, AlertLogEntry, AssessmentStore, Channel, ChannelTally, Metric, Observation,
        RecipientResolver, RiskAssessment, RiskLevel, SourceKind,
    };
    use std::collections::{BTreeMap, BTreeSet};

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1).await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_region(db: &Database, name: &str) -> Region {
        region::create_region(
            db.pool(),
            &NewRegion {
                name: name.to_string(),
                state: Some("Assam".to_string()),
                latitude: 26.14,
                longitude: 91.73,
                station_id: Some("BRH-042".to_string()),
                population: Some(1_250_000),
            },
        )
        .await
        .unwrap()
    }

    fn new_recipient(phone: &str, region_id: i64, channels: &[Channel]) -> NewRecipient {
        NewRecipient {
            phone_number: phone.to_string(),
            name: None,
            region_id,
            language: None,
            channels: Some(channels.iter().copied().collect::<BTreeSet<_>>()),
        }
    }

    fn assessment(region_id: i64, score: u8, minutes: i64) -> RiskAssessment {
        let computed_at =
            Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap() + Duration::minutes(minutes);
        RiskAssessment {
            region_id,
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            factors: vec!["High rainfall: 90.0mm in 6h".to_string()],
            computed_at,
            valid_until: computed_at + Duration::hours(24),
            inputs: vec![Observation::new(
                SourceKind::Nowcast,
                "region-1",
                computed_at,
                computed_at + Duration::hours(6),
            )
            .with_metric(Metric::Rainfall6h, 90.0)],
        }
    }

    fn log_entry(region_id: i64, created_at: chrono::DateTime<Utc>) -> AlertLogEntry {
        let mut per_channel = BTreeMap::new();
        per_channel.insert(Channel::Sms, ChannelTally { attempted: 2, succeeded: 1 });
        AlertLogEntry {
            region_id,
            message: "Move to higher ground".to_string(),
            risk_level: RiskLevel::High,
            attempted_count: 2,
            succeeded_count: 1,
            per_channel,
            issued_by: "district-control".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_region_create_get_list() {
        let db = test_db().await;

        let created = seed_region(&db, "Kamrup").await;
        let fetched = region::get_region(db.pool(), created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.fetch_target().station_id.as_deref(), Some("BRH-042"));

        seed_region(&db, "Barpeta").await;
        let names: Vec<String> = region::list_regions(db.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Barpeta", "Kamrup"]);

        let missing = region::get_region(db.pool(), 999).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_region_rejected() {
        let db = test_db().await;
        seed_region(&db, "Kamrup").await;

        let result = region::create_region(
            db.pool(),
            &NewRegion {
                name: "Kamrup".to_string(),
                state: None,
                latitude: 0.0,
                longitude: 0.0,
                station_id: None,
                population: None,
            },
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_recipient_registration_and_resolution() {
        let db = test_db().await;
        let kamrup = seed_region(&db, "Kamrup").await;
        let barpeta = seed_region(&db, "Barpeta").await;

        let a = recipient::create_recipient(
            db.pool(),
            &new_recipient("+919800000001", kamrup.id, &[Channel::Sms]),
        )
        .await
        .unwrap();
        let b = recipient::create_recipient(
            db.pool(),
            &new_recipient("+919800000002", kamrup.id, &[Channel::Sms, Channel::Whatsapp]),
        )
        .await
        .unwrap();
        recipient::create_recipient(
            db.pool(),
            &new_recipient("+919800000003", barpeta.id, &[Channel::Sms]),
        )
        .await
        .unwrap();
        recipient::set_active(db.pool(), a.id, false).await.unwrap();

        let resolved = db.resolve(kamrup.id).await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(!resolved[0].active);
        assert_eq!(resolved[1].id, b.id);
        assert_eq!(resolved[1].channels.len(), 2);
        assert_eq!(b.language, "en");
    }

    #[tokio::test]
    async fn test_recipient_validation() {
        let db = test_db().await;
        let kamrup = seed_region(&db, "Kamrup").await;

        let bad_phone =
            recipient::create_recipient(db.pool(), &new_recipient("12ab", kamrup.id, &[])).await;
        assert!(matches!(bad_phone, Err(DatabaseError::Validation(_))));

        let no_region =
            recipient::create_recipient(db.pool(), &new_recipient("+919800000001", 42, &[])).await;
        assert!(matches!(no_region, Err(DatabaseError::NotFound { .. })));

        recipient::create_recipient(db.pool(), &new_recipient("+919800000001", kamrup.id, &[]))
            .await
            .unwrap();
        let duplicate =
            recipient::create_recipient(db.pool(), &new_recipient("+919800000001", kamrup.id, &[]))
                .await;
        assert!(matches!(duplicate, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_assessment_store_latest_by_timestamp() {
        let db = test_db().await;
        let region = seed_region(&db, "Kamrup").await;

        let later = assessment(region.id, 40, 30);
        db.store(&later).await.unwrap();
        db.store(&assessment(region.id, 75, 0)).await.unwrap();

        let latest = db.latest_for(region.id).await.unwrap().unwrap();
        assert_eq!(latest, later);

        let history = assessment::history_for_region(db.pool(), region.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].risk_score, 75);

        assert!(db.latest_for(region.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_append_only() {
        let db = test_db().await;
        let region = seed_region(&db, "Kamrup").await;
        let id = db.store(&assessment(region.id, 40, 0)).await.unwrap();

        let update = sqlx::query("UPDATE risk_assessments SET risk_score = 0 WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM alert_log").execute(db.pool()).await;
        assert!(delete.is_ok(), "deleting zero rows fires no trigger");

        db.append(&log_entry(region.id, Utc::now())).await.unwrap();
        let delete = sqlx::query("DELETE FROM alert_log").execute(db.pool()).await;
        assert!(delete.is_err());
    }

    #[tokio::test]
    async fn test_alert_log_recent_and_stats() {
        let db = test_db().await;
        let region = seed_region(&db, "Kamrup").await;
        recipient::create_recipient(
            db.pool(),
            &new_recipient("+919800000001", region.id, &[Channel::Sms]),
        )
        .await
        .unwrap();

        let now = Utc::now();
        db.append(&log_entry(region.id, now - Duration::hours(30))).await.unwrap();
        let recent_id = db.append(&log_entry(region.id, now - Duration::hours(1))).await.unwrap();

        let recent = alert_log::list_recent(db.pool(), alert_log::DEFAULT_HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, recent_id);
        assert_eq!(
            recent[0].entry.per_channel[&Channel::Sms],
            ChannelTally { attempted: 2, succeeded: 1 }
        );

        let stats = stats::dashboard_stats(db.pool()).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_recipients: 1,
                total_regions: 1,
                alerts_sent_24h: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_region_summaries_show_latest_risk() {
        let db = test_db().await;
        let kamrup = seed_region(&db, "Kamrup").await;
        seed_region(&db, "Barpeta").await;

        db.store(&assessment(kamrup.id, 20, 0)).await.unwrap();
        db.store(&assessment(kamrup.id, 55, 10)).await.unwrap();

        let summaries = region::list_region_summaries(db.pool()).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Barpeta");
        assert_eq!(summaries[0].latest_risk_level, None);
        assert_eq!(summaries[1].latest_risk_level.as_deref(), Some("high"));
        assert_eq!(summaries[1].latest_risk_score, Some(55));
    }
}
