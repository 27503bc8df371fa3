//! The assessment service: fetch, score, persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use flood_core::{
    AssessmentStore, FetchTarget, Observation, RegionId, RiskAssessment, SourceAdapter,
    SourceUnavailable,
};
use flood_sources::{collect_observations, SourceConfig};
use tracing::{debug, info};

use crate::aggregator::assess_at;
use crate::error::AssessmentError;
use crate::recommend::recommend;

/// One persisted assessment and the actions derived from it.
#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    /// Store id of the persisted assessment.
    pub id: i64,
    pub assessment: RiskAssessment,
    pub recommendations: Vec<String>,
    /// Sources that failed, timed out, or answered with stale data.
    pub unavailable: Vec<SourceUnavailable>,
}

/// Runs assessments against a fixed set of adapters and one store.
///
/// Holds no per-region state; concurrent assessments for different regions
/// only meet inside the store.
pub struct AssessmentService {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: Arc<dyn AssessmentStore>,
    config: SourceConfig,
}

impl AssessmentService {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn AssessmentStore>,
        config: SourceConfig,
    ) -> Self {
        Self {
            adapters,
            store,
            config,
        }
    }

    /// Number of configured source adapters.
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Fetch from every adapter, then score and persist.
    pub async fn assess_region(
        &self,
        target: &FetchTarget,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        let collected = collect_observations(&self.adapters, target, &self.config).await;
        self.score_and_store(target.region_id, collected.observations, collected.unavailable)
            .await
    }

    /// Score and persist observations supplied by the caller.
    pub async fn assess_observations(
        &self,
        region_id: RegionId,
        observations: Vec<Observation>,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        self.score_and_store(region_id, observations, Vec::new()).await
    }

    /// The most recent stored assessment for a region.
    pub async fn latest_for(
        &self,
        region_id: RegionId,
    ) -> Result<Option<RiskAssessment>, AssessmentError> {
        Ok(self.store.latest_for(region_id).await?)
    }

    async fn score_and_store(
        &self,
        region_id: RegionId,
        observations: Vec<Observation>,
        mut unavailable: Vec<SourceUnavailable>,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        let now = Utc::now();
        let fresh = drop_expired(observations, now, &mut unavailable);

        let assessment = assess_at(region_id, &fresh, now)?;
        let recommendations = recommend(&fresh);
        let id = self.store.store(&assessment).await?;

        info!(
            region_id,
            assessment_id = id,
            risk_score = assessment.risk_score,
            risk_level = %assessment.risk_level,
            observations = fresh.len(),
            unavailable = unavailable.len(),
            "Stored risk assessment"
        );

        Ok(AssessmentOutcome {
            id,
            assessment,
            recommendations,
            unavailable,
        })
    }
}

fn drop_expired(
    observations: Vec<Observation>,
    now: DateTime<Utc>,
    unavailable: &mut Vec<SourceUnavailable>,
) -> Vec<Observation> {
    observations
        .into_iter()
        .filter(|o| {
            if o.is_expired_at(now) {
                debug!(source = %o.source, valid_until = %o.valid_until, "Dropping expired observation");
                unavailable.push(SourceUnavailable::new(o.source, "observation expired"));
                false
            } else {
                true
            }
        })
        .collect()
}
