//! Shared HTTP and payload helpers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// GET `url` with query parameters and decode a JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    debug!(url = %url, "Fetching upstream feed");

    let response = client
        .get(url)
        .query(query)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive ISO 8601 timestamp which is
/// taken to be UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| FetchError::Malformed(format!("unparseable timestamp '{}'", raw)))
}

/// Reject negative or non-finite readings.
pub(crate) fn non_negative(name: &str, value: f64) -> Result<f64, FetchError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FetchError::Malformed(format!("{} out of range: {}", name, value)))
    }
}
