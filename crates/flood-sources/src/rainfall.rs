//! Historical daily rainfall adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use flood_core::{FetchTarget, Metric, Observation, SourceAdapter, SourceKind, SourceUnavailable};
use serde::Deserialize;
use tracing::warn;

use crate::error::FetchError;
use crate::http::{get_json, non_negative};

/// Days of history requested and summed into the accumulation metric.
pub const HISTORY_DAYS: usize = 7;

#[derive(Debug, Deserialize)]
pub(crate) struct RainfallResponse {
    pub data: Vec<DailyRainfall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyRainfall {
    pub date: String,
    pub rainfall_mm: f64,
}

/// Daily rainfall totals for the last [`HISTORY_DAYS`] days.
///
/// Requests `GET {base_url}?lat=..&lon=..&days=7` and expects
/// `{"data": [{"date": "2024-07-01", "rainfall_mm": 12.4}, ...]}`.
///
/// The most recent day becomes [`Metric::Rainfall24h`]; the sum over the
/// window becomes [`Metric::Rainfall7dTotal`].
pub struct RainfallHistoryAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl RainfallHistoryAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_inner(&self, target: &FetchTarget) -> Result<Observation, FetchError> {
        let query = [
            ("lat", target.latitude.to_string()),
            ("lon", target.longitude.to_string()),
            ("days", HISTORY_DAYS.to_string()),
        ];
        let response: RainfallResponse = get_json(&self.client, &self.base_url, &query).await?;
        parse_rainfall(response, &format!("region-{}", target.region_id), Utc::now())
    }
}

pub(crate) fn parse_rainfall(
    response: RainfallResponse,
    target_id: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Observation, FetchError> {
    let mut days = Vec::with_capacity(response.data.len());
    for day in response.data {
        let date = NaiveDate::parse_from_str(day.date.trim(), "%Y-%m-%d")
            .map_err(|_| FetchError::Malformed(format!("unparseable date '{}'", day.date)))?;
        days.push((date, non_negative("rainfall_mm", day.rainfall_mm)?));
    }

    // Newest first, regardless of upstream ordering.
    days.sort_by(|a, b| b.0.cmp(&a.0));
    days.truncate(HISTORY_DAYS);

    let Some(&(_, latest)) = days.first() else {
        return Err(FetchError::Malformed("no rainfall records".to_string()));
    };
    let total: f64 = days.iter().map(|(_, mm)| mm).sum();

    Ok(Observation::new(
        SourceKind::HistoricalRainfall,
        target_id,
        fetched_at,
        fetched_at + Duration::hours(24),
    )
    .with_metric(Metric::Rainfall24h, latest)
    .with_metric(Metric::Rainfall7dTotal, total))
}

#[async_trait]
impl SourceAdapter for RainfallHistoryAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::HistoricalRainfall
    }

    async fn fetch(&self, target: &FetchTarget) -> Result<Observation, SourceUnavailable> {
        self.fetch_inner(target).await.map_err(|e| {
            warn!(region_id = target.region_id, error = %e, "Rainfall history fetch failed");
            e.into_unavailable(SourceKind::HistoricalRainfall)
        })
    }
}
