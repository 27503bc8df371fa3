//! The source adapter seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceUnavailable;
use crate::observation::{Observation, SourceKind};
use crate::RegionId;

/// Where to fetch observations for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchTarget {
    pub region_id: RegionId,
    pub latitude: f64,
    pub longitude: f64,
    /// River gauge station serving the region, if any.
    pub station_id: Option<String>,
}

impl FetchTarget {
    pub fn new(region_id: RegionId, latitude: f64, longitude: f64) -> Self {
        Self {
            region_id,
            latitude,
            longitude,
            station_id: None,
        }
    }

    pub fn with_station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }
}

/// Wraps exactly one upstream feed.
///
/// Every upstream failure (transport error, bad status, malformed payload,
/// timeout) comes back as [`SourceUnavailable`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The feed this adapter wraps.
    fn kind(&self) -> SourceKind;

    /// Fetch one observation for the target.
    async fn fetch(&self, target: &FetchTarget) -> Result<Observation, SourceUnavailable>;
}
