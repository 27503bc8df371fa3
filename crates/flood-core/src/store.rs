//! Append-only persistence contracts.
//!
//! Neither trait exposes update or delete: history is immutable.

use async_trait::async_trait;

use crate::alert::AlertLogEntry;
use crate::error::StoreError;
use crate::risk::RiskAssessment;
use crate::RegionId;

/// Persists risk assessments, one record per invocation.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Store an assessment and return its id.
    async fn store(&self, assessment: &RiskAssessment) -> Result<i64, StoreError>;

    /// The most recent assessment for a region, by `computed_at`.
    async fn latest_for(&self, region_id: RegionId) -> Result<Option<RiskAssessment>, StoreError>;
}

/// Audit trail of broadcasts.
#[async_trait]
pub trait AlertLog: Send + Sync {
    /// Append one entry and return its id.
    async fn append(&self, entry: &AlertLogEntry) -> Result<i64, StoreError>;
}
