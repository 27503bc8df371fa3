//! River gauge water-level adapter.

use async_trait::async_trait;
use chrono::Duration;
use flood_core::{FetchTarget, Metric, Observation, SourceAdapter, SourceKind, SourceUnavailable};
use serde::Deserialize;
use tracing::warn;

use crate::error::FetchError;
use crate::http::{get_json, non_negative, parse_timestamp};

/// Warning stage used when the gauge payload omits one, in meters.
pub const DEFAULT_WARNING_LEVEL_M: f64 = 7.0;

/// Danger stage used when the gauge payload omits one, in meters.
pub const DEFAULT_DANGER_LEVEL_M: f64 = 8.5;

/// Gauges report every 15 minutes; four missed reports make a reading stale.
const VALIDITY_MINUTES: i64 = 60;

#[derive(Debug, Deserialize)]
pub(crate) struct GaugeResponse {
    pub station_id: String,
    pub timestamp: String,
    pub water_level: WaterLevelBody,
    #[serde(default)]
    pub flow_rate: Option<FlowRateBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaterLevelBody {
    pub current_m: f64,
    pub danger_level_m: Option<f64>,
    pub warning_level_m: Option<f64>,
    pub normal_level_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlowRateBody {
    pub current_cumecs: Option<f64>,
}

/// Real-time water level from a river monitoring station.
///
/// Requests `GET {base_url}/{station_id}` and expects:
///
/// ```json
/// {
///   "station_id": "BRH-042",
///   "timestamp": "2024-07-01T06:00:00",
///   "water_level": {"current_m": 7.8, "danger_level_m": 8.5, "warning_level_m": 7.0},
///   "flow_rate": {"current_cumecs": 212.0}
/// }
/// ```
///
/// Targets without a gauge station are reported unavailable without a call.
pub struct GaugeAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GaugeAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_inner(&self, target: &FetchTarget) -> Result<Observation, FetchError> {
        let station_id = target
            .station_id
            .as_deref()
            .ok_or_else(|| FetchError::NotApplicable("no gauge station for region".to_string()))?;

        let url = station_url(&self.base_url, station_id)?;
        let response: GaugeResponse = get_json(&self.client, url.as_str(), &[]).await?;
        parse_gauge(response)
    }
}

/// `{base_url}/{station_id}` with the station id as one escaped path segment.
pub(crate) fn station_url(base_url: &str, station_id: &str) -> Result<reqwest::Url, FetchError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .push(station_id);
    Ok(url)
}

pub(crate) fn parse_gauge(response: GaugeResponse) -> Result<Observation, FetchError> {
    let captured_at = parse_timestamp(&response.timestamp)?;
    let level = &response.water_level;

    let current = non_negative("current_m", level.current_m)?;
    let warning = non_negative(
        "warning_level_m",
        level.warning_level_m.unwrap_or(DEFAULT_WARNING_LEVEL_M),
    )?;
    let danger = non_negative(
        "danger_level_m",
        level.danger_level_m.unwrap_or(DEFAULT_DANGER_LEVEL_M),
    )?;
    if warning > danger {
        return Err(FetchError::Malformed(format!(
            "warning level {}m above danger level {}m",
            warning, danger
        )));
    }

    let mut observation = Observation::new(
        SourceKind::WaterLevel,
        response.station_id,
        captured_at,
        captured_at + Duration::minutes(VALIDITY_MINUTES),
    )
    .with_metric(Metric::WaterLevel, current)
    .with_metric(Metric::WarningLevel, warning)
    .with_metric(Metric::DangerLevel, danger);

    if let Some(normal) = level.normal_level_m {
        observation = observation.with_metric(Metric::NormalLevel, normal);
    }
    if let Some(flow) = response.flow_rate.and_then(|f| f.current_cumecs) {
        observation = observation.with_metric(Metric::FlowRate, flow);
    }

    Ok(observation)
}

#[async_trait]
impl SourceAdapter for GaugeAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::WaterLevel
    }

    async fn fetch(&self, target: &FetchTarget) -> Result<Observation, SourceUnavailable> {
        self.fetch_inner(target).await.map_err(|e| {
            warn!(
                region_id = target.region_id,
                station = ?target.station_id,
                error = %e,
                "Gauge fetch failed"
            );
            e.into_unavailable(SourceKind::WaterLevel)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GaugeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_gauge_with_thresholds() {
        let obs = parse_gauge(response(
            r#"{"station_id": "BRH-042", "timestamp": "2024-07-01T06:00:00",
                "water_level": {"current_m": 7.8, "danger_level_m": 9.0, "warning_level_m": 7.5,
                                "normal_level_m": 5.0},
                "flow_rate": {"current_cumecs": 212.0}}"#,
        ))
        .unwrap();

        assert_eq!(obs.target_id, "BRH-042");
        assert_eq!(obs.metric(Metric::WaterLevel), Some(7.8));
        assert_eq!(obs.metric(Metric::WarningLevel), Some(7.5));
        assert_eq!(obs.metric(Metric::DangerLevel), Some(9.0));
        assert_eq!(obs.metric(Metric::FlowRate), Some(212.0));
        assert_eq!(obs.valid_until - obs.captured_at, Duration::minutes(60));
    }

    #[test]
    fn test_missing_thresholds_use_defaults() {
        let obs = parse_gauge(response(
            r#"{"station_id": "BRH-042", "timestamp": "2024-07-01T06:00:00Z",
                "water_level": {"current_m": 4.0}}"#,
        ))
        .unwrap();

        assert_eq!(obs.metric(Metric::WarningLevel), Some(DEFAULT_WARNING_LEVEL_M));
        assert_eq!(obs.metric(Metric::DangerLevel), Some(DEFAULT_DANGER_LEVEL_M));
        assert_eq!(obs.metric(Metric::FlowRate), None);
    }

    #[test]
    fn test_inverted_thresholds_are_malformed() {
        let result = parse_gauge(response(
            r#"{"station_id": "X", "timestamp": "2024-07-01T06:00:00Z",
                "water_level": {"current_m": 4.0, "warning_level_m": 9.0, "danger_level_m": 8.0}}"#,
        ));
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_station_url_escapes_the_station_id() {
        let url = station_url("http://gauges.example/api/", "BRH-042").unwrap();
        assert_eq!(url.as_str(), "http://gauges.example/api/BRH-042");

        let url = station_url("http://gauges.example/api", "BRH/42?admin=1").unwrap();
        assert_eq!(url.as_str(), "http://gauges.example/api/BRH%2F42%3Fadmin=1");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_station_url_rejects_unusable_base() {
        assert!(matches!(
            station_url("not a url", "BRH-042"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            station_url("mailto:ops@example.org", "BRH-042"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_target_without_station_is_unavailable() {
        let adapter = GaugeAdapter::new(reqwest::Client::new(), "http://127.0.0.1:9/gauges");
        let err = adapter.fetch(&FetchTarget::new(4, 26.1, 91.7)).await.unwrap_err();
        assert_eq!(err.kind, SourceKind::WaterLevel);
        assert!(err.reason.contains("no gauge station"));
    }
}
