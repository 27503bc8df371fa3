//! Error types for risk assessment.

use flood_core::{RegionId, StoreError};
use thiserror::Error;

/// Errors that can occur during an assessment.
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// No usable observation was available for the region.
    #[error("insufficient data to assess region {region_id}")]
    InsufficientData { region_id: RegionId },

    /// The assessment could not be persisted or read back.
    #[error("assessment store error: {0}")]
    Store(#[from] StoreError),
}
