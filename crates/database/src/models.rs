//! Database models.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use flood_core::{AlertLogEntry, Channel, FetchTarget, Recipient};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

/// A region in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Region {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Display name, unique.
    pub name: String,
    /// State or province.
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// River gauge station serving the region.
    pub station_id: Option<String>,
    pub population: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

impl Region {
    /// Where the source adapters should look for this region.
    pub fn fetch_target(&self) -> FetchTarget {
        let target = FetchTarget::new(self.id, self.latitude, self.longitude);
        match &self.station_id {
            Some(station) => target.with_station(station.clone()),
            None => target,
        }
    }
}

/// Fields for registering a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegion {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
}

/// A recipient row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecipientRecord {
    /// Auto-incrementing ID.
    pub id: i64,
    pub phone_number: String,
    pub name: Option<String>,
    pub region_id: i64,
    /// Language tag (e.g., "en", "as-IN").
    pub language: String,
    pub sms_enabled: bool,
    pub whatsapp_enabled: bool,
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl RecipientRecord {
    /// Snapshot for the dispatcher.
    pub fn to_recipient(&self) -> Recipient {
        let mut channels = BTreeSet::new();
        if self.sms_enabled {
            channels.insert(Channel::Sms);
        }
        if self.whatsapp_enabled {
            channels.insert(Channel::Whatsapp);
        }

        let recipient = Recipient::new(self.id, self.phone_number.clone(), self.region_id, channels);
        if self.is_active {
            recipient
        } else {
            recipient.inactive()
        }
    }
}

/// Fields for registering a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipient {
    pub phone_number: String,
    #[serde(default)]
    pub name: Option<String>,
    pub region_id: i64,
    #[serde(default)]
    pub language: Option<String>,
    /// Defaults to SMS only.
    #[serde(default)]
    pub channels: Option<BTreeSet<Channel>>,
}

/// Raw risk assessment row.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AssessmentRow {
    pub id: i64,
    pub region_id: i64,
    pub risk_score: i64,
    pub risk_level: String,
    pub factors: String,
    pub inputs: String,
    pub computed_at: String,
    pub valid_until: String,
}

/// Raw alert log row.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AlertLogRow {
    pub id: i64,
    pub region_id: i64,
    pub message: String,
    pub risk_level: String,
    pub attempted_count: i64,
    pub succeeded_count: i64,
    pub per_channel: String,
    pub issued_by: String,
    pub created_at: String,
}

/// A stored alert log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    #[serde(flatten)]
    pub entry: AlertLogEntry,
}

impl TryFrom<AlertLogRow> for AlertRecord {
    type Error = DatabaseError;

    fn try_from(row: AlertLogRow) -> Result<Self> {
        Ok(AlertRecord {
            id: row.id,
            entry: AlertLogEntry {
                region_id: row.region_id,
                message: row.message,
                risk_level: row
                    .risk_level
                    .parse()
                    .map_err(|e| DatabaseError::corrupt("alert_log", e))?,
                attempted_count: count(row.attempted_count)?,
                succeeded_count: count(row.succeeded_count)?,
                per_channel: serde_json::from_str(&row.per_channel)
                    .map_err(|e| DatabaseError::corrupt("alert_log", e))?,
                issued_by: row.issued_by,
                created_at: parse_time("alert_log", &row.created_at)?,
            },
        })
    }
}

fn count(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|e| DatabaseError::corrupt("alert_log", e))
}

/// A region with its latest risk, for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RegionSummary {
    pub id: i64,
    pub name: String,
    pub state: Option<String>,
    pub latest_risk_level: Option<String>,
    pub latest_risk_score: Option<i64>,
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_recipients: i64,
    pub total_regions: i64,
    pub alerts_sent_24h: i64,
}

/// Format a timestamp for storage. Millisecond RFC 3339 in UTC sorts lexically.
pub(crate) fn format_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_time(entity: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::corrupt(entity, format!("bad timestamp '{}': {}", raw, e)))
}
