//! Region directory and risk endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::region;
use database::{NewRegion, Region, RegionSummary};
use flood_core::{Observation, RegionId, RiskAssessment, SourceKind, SourceUnavailable};
use risk_engine::AssessmentOutcome;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Every region with its latest risk.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RegionSummary>>> {
    Ok(Json(region::list_region_summaries(state.db.pool()).await?))
}

/// Register a region.
pub async fn create(
    State(state): State<AppState>,
    Json(new_region): Json<NewRegion>,
) -> Result<(StatusCode, Json<Region>)> {
    let created = region::create_region(state.db.pool(), &new_region).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Latest stored assessment for a region.
pub async fn latest_risk(
    State(state): State<AppState>,
    Path(id): Path<RegionId>,
) -> Result<Json<RiskAssessment>> {
    // 404 for unknown regions before looking at history.
    region::get_region(state.db.pool(), id).await?;

    state
        .assessments
        .latest_for(id)
        .await?
        .map(Json)
        .ok_or_else(|| AdminError::NotFound(format!("no assessment for region {}", id)))
}

/// Optional body for an assessment run.
#[derive(Debug, Default, Deserialize)]
pub struct AssessRequest {
    /// Score these instead of fetching from the configured sources.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

#[derive(Debug, Serialize)]
pub struct UnavailableSource {
    pub source: SourceKind,
    pub reason: String,
}

impl From<SourceUnavailable> for UnavailableSource {
    fn from(err: SourceUnavailable) -> Self {
        Self {
            source: err.kind,
            reason: err.reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub id: i64,
    pub assessment: RiskAssessment,
    pub recommendations: Vec<String>,
    pub unavailable: Vec<UnavailableSource>,
}

impl From<AssessmentOutcome> for AssessResponse {
    fn from(outcome: AssessmentOutcome) -> Self {
        Self {
            id: outcome.id,
            assessment: outcome.assessment,
            recommendations: outcome.recommendations,
            unavailable: outcome.unavailable.into_iter().map(Into::into).collect(),
        }
    }
}

/// Run an assessment for a region and store it.
///
/// With observations in the body they are scored directly; otherwise every
/// configured source is fetched for the region's location.
pub async fn assess(
    State(state): State<AppState>,
    Path(id): Path<RegionId>,
    body: Option<Json<AssessRequest>>,
) -> Result<Json<AssessResponse>> {
    let region = region::get_region(state.db.pool(), id).await?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let outcome = if request.observations.is_empty() {
        info!(
            region_id = id,
            adapters = state.assessments.adapter_count(),
            "Fetching observations"
        );
        state.assessments.assess_region(&region.fetch_target()).await?
    } else {
        state
            .assessments
            .assess_observations(id, request.observations)
            .await?
    };

    Ok(Json(outcome.into()))
}
