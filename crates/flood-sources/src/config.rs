//! Configuration types for the fetch phase.

use std::time::Duration;

/// Timeouts and HTTP settings shared by all adapters.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Upper bound for a single adapter call.
    pub per_source_timeout: Duration,
    /// Upper bound for the whole fetch phase.
    pub deadline: Duration,
    /// User agent sent to upstream feeds.
    pub user_agent: String,
}

impl SourceConfig {
    pub fn new(per_source_timeout: Duration, deadline: Duration) -> Self {
        Self {
            per_source_timeout,
            deadline,
            ..Self::default()
        }
    }

    /// Build the HTTP client shared by the adapters.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.per_source_timeout)
            .build()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            per_source_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(8),
            user_agent: format!("floodwatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
