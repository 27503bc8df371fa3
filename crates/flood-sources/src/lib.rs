//! Upstream feed adapters for FloodWatch.
//!
//! Each adapter wraps exactly one feed and normalizes it into an
//! [`Observation`](flood_core::Observation):
//!
//! - [`NowcastAdapter`] - Short-term precipitation nowcast (1h/3h/6h windows)
//! - [`RainfallHistoryAdapter`] - Daily rainfall for the last seven days
//! - [`GaugeAdapter`] - River gauge water level and stage thresholds
//!
//! [`collect_observations`] runs a set of adapters concurrently under a
//! per-source timeout and a global deadline.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flood_core::{FetchTarget, SourceAdapter};
//! use flood_sources::{collect_observations, NowcastAdapter, SourceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SourceConfig::default();
//! let client = config.http_client()?;
//! let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
//!     Arc::new(NowcastAdapter::new(client, "https://nowcast.example/api")),
//! ];
//!
//! let target = FetchTarget::new(1, 26.14, 91.73);
//! let collected = collect_observations(&adapters, &target, &config).await;
//! println!("{} observations", collected.observations.len());
//! # Ok(())
//! # }
//! ```

mod collect;
mod config;
mod error;
mod gauge;
mod http;
mod nowcast;
mod rainfall;

pub use collect::{collect_observations, Collected};
pub use config::SourceConfig;
pub use error::FetchError;
pub use gauge::{GaugeAdapter, DEFAULT_DANGER_LEVEL_M, DEFAULT_WARNING_LEVEL_M};
pub use nowcast::NowcastAdapter;
pub use rainfall::{RainfallHistoryAdapter, HISTORY_DAYS};
