//! Pipeline collaborator traits backed by SQLite.

use async_trait::async_trait;
use flood_core::{
    AlertLog, AlertLogEntry, AssessmentStore, Recipient, RecipientResolver, RegionId,
    ResolveError, RiskAssessment, StoreError,
};

use crate::{alert_log, assessment, recipient, Database};

#[async_trait]
impl AssessmentStore for Database {
    async fn store(&self, assessment: &RiskAssessment) -> Result<i64, StoreError> {
        Ok(assessment::insert_assessment(self.pool(), assessment).await?)
    }

    async fn latest_for(&self, region_id: RegionId) -> Result<Option<RiskAssessment>, StoreError> {
        Ok(assessment::latest_for_region(self.pool(), region_id).await?)
    }
}

#[async_trait]
impl AlertLog for Database {
    async fn append(&self, entry: &AlertLogEntry) -> Result<i64, StoreError> {
        Ok(alert_log::append_entry(self.pool(), entry).await?)
    }
}

#[async_trait]
impl RecipientResolver for Database {
    async fn resolve(&self, region_id: RegionId) -> Result<Vec<Recipient>, ResolveError> {
        let records = recipient::list_for_region(self.pool(), region_id).await?;
        Ok(records.iter().map(|r| r.to_recipient()).collect())
    }
}
