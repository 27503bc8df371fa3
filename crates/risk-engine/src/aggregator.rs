//! The risk aggregator.

use chrono::{DateTime, Duration, Utc};
use flood_core::{clamp_score, Observation, RegionId, RiskAssessment, RiskLevel, ASSESSMENT_HORIZON_HOURS};

use crate::error::AssessmentError;
use crate::scoring::{
    rainfall_contribution, scored_gauge, scored_rainfall, water_level_contribution,
    RAINFALL_UNAVAILABLE, WATER_LEVEL_UNAVAILABLE,
};

/// Assess a region from a set of observations, stamped with the current time.
///
/// See [`assess_at`].
pub fn assess(
    region_id: RegionId,
    observations: &[Observation],
) -> Result<RiskAssessment, AssessmentError> {
    assess_at(region_id, observations, Utc::now())
}

/// Assess a region from a set of observations.
///
/// Score, level, and factors depend only on `observations`. A missing
/// rainfall or water-level source contributes nothing and is noted in the
/// factors; only an empty input fails.
///
/// Factors are ordered rainfall first, then water level.
pub fn assess_at(
    region_id: RegionId,
    observations: &[Observation],
    computed_at: DateTime<Utc>,
) -> Result<RiskAssessment, AssessmentError> {
    if observations.is_empty() {
        return Err(AssessmentError::InsufficientData { region_id });
    }

    let mut raw_score: i64 = 0;
    let mut factors = Vec::new();

    match scored_rainfall(observations) {
        Some((window, mm)) => {
            if let Some(contribution) = rainfall_contribution(window, mm) {
                raw_score += contribution.points;
                factors.push(contribution.factor);
            }
        }
        None => factors.push(RAINFALL_UNAVAILABLE.to_string()),
    }

    match scored_gauge(observations) {
        Some(gauge) => {
            if let Some(contribution) =
                water_level_contribution(gauge.current_m, gauge.warning_m, gauge.danger_m)
            {
                raw_score += contribution.points;
                factors.push(contribution.factor);
            }
        }
        None => factors.push(WATER_LEVEL_UNAVAILABLE.to_string()),
    }

    let risk_score = clamp_score(raw_score);

    Ok(RiskAssessment {
        region_id,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        factors,
        computed_at,
        valid_until: computed_at + Duration::hours(ASSESSMENT_HORIZON_HOURS),
        inputs: observations.to_vec(),
    })
}
