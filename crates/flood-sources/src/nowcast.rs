//! Precipitation nowcast adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use flood_core::{FetchTarget, Metric, Observation, SourceAdapter, SourceKind, SourceUnavailable};
use serde::Deserialize;
use tracing::warn;

use crate::error::FetchError;
use crate::http::{get_json, non_negative, parse_timestamp};

/// How long a nowcast stays valid when the feed does not say.
const DEFAULT_VALIDITY_HOURS: i64 = 6;

#[derive(Debug, Deserialize)]
pub(crate) struct NowcastResponse {
    pub timestamp: String,
    pub nowcast: NowcastBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NowcastBody {
    pub rainfall_1h: Option<f64>,
    pub rainfall_3h: Option<f64>,
    pub rainfall_6h: Option<f64>,
    pub valid_until: Option<String>,
}

/// Short-term (0-6 hour) precipitation nowcast for a location.
///
/// Requests `GET {base_url}?lat=..&lon=..&format=json` and expects:
///
/// ```json
/// {
///   "timestamp": "2024-07-01T06:00:00",
///   "nowcast": {"rainfall_1h": 4.2, "rainfall_3h": 18.0, "rainfall_6h": 61.5,
///               "valid_until": "2024-07-01T12:00:00"}
/// }
/// ```
pub struct NowcastAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl NowcastAdapter {
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
            ("format", "json".to_string()),
        ];
        let response: NowcastResponse = get_json(&self.client, &self.base_url, &query).await?;
        parse_nowcast(response, &region_key(target))
    }
}

fn region_key(target: &FetchTarget) -> String {
    format!("region-{}", target.region_id)
}

pub(crate) fn parse_nowcast(
    response: NowcastResponse,
    target_id: &str,
) -> Result<Observation, FetchError> {
    let captured_at = parse_timestamp(&response.timestamp)?;
    let valid_until: DateTime<Utc> = match response.nowcast.valid_until.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => captured_at + Duration::hours(DEFAULT_VALIDITY_HOURS),
    };

    let windows = [
        (Metric::Rainfall1h, response.nowcast.rainfall_1h),
        (Metric::Rainfall3h, response.nowcast.rainfall_3h),
        (Metric::Rainfall6h, response.nowcast.rainfall_6h),
    ];

    let mut observation = Observation::new(SourceKind::Nowcast, target_id, captured_at, valid_until);
    for (metric, value) in windows {
        if let Some(value) = value {
            observation = observation.with_metric(metric, non_negative("rainfall", value)?);
        }
    }

    if observation.metrics.is_empty() {
        return Err(FetchError::Malformed("nowcast carried no rainfall windows".to_string()));
    }

    Ok(observation)
}

#[async_trait]
impl SourceAdapter for NowcastAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Nowcast
    }

    async fn fetch(&self, target: &FetchTarget) -> Result<Observation, SourceUnavailable> {
        self.fetch_inner(target).await.map_err(|e| {
            warn!(region_id = target.region_id, error = %e, "Nowcast fetch failed");
            e.into_unavailable(SourceKind::Nowcast)
        })
    }
}
