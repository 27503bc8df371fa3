//! Error types for upstream fetches.

use flood_core::{SourceKind, SourceUnavailable};
use thiserror::Error;

/// Errors that can occur while talking to an upstream feed.
///
/// Never leaves this crate as-is: adapters convert it into
/// [`SourceUnavailable`] at their boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload parsed but did not carry usable values.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The call ran out of time.
    #[error("timed out")]
    Timeout,

    /// The configured base URL cannot carry a path.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The target lacks what this feed needs (e.g. a gauge station).
    #[error("not applicable: {0}")]
    NotApplicable(String),
}

impl FetchError {
    /// Convert into the boundary error for `kind`.
    pub fn into_unavailable(self, kind: SourceKind) -> SourceUnavailable {
        match self {
            FetchError::Http(ref e) if e.is_timeout() => SourceUnavailable::timed_out(kind),
            FetchError::Timeout => SourceUnavailable::timed_out(kind),
            other => SourceUnavailable::new(kind, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_converts_to_unavailable() {
        let err = FetchError::Status(503).into_unavailable(SourceKind::Nowcast);
        assert_eq!(err.kind, SourceKind::Nowcast);
        assert_eq!(err.reason, "upstream returned status 503");
        assert_eq!(err.to_string(), "nowcast source unavailable: upstream returned status 503");
    }

    #[test]
    fn test_timeout_converts_to_timed_out() {
        let err = FetchError::Timeout.into_unavailable(SourceKind::WaterLevel);
        assert_eq!(err, SourceUnavailable::timed_out(SourceKind::WaterLevel));
    }
}
