//! Risk assessment history. Append-only.

use flood_core::RiskAssessment;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{format_time, parse_time, AssessmentRow};

/// Append an assessment and return its ID.
pub async fn insert_assessment(pool: &SqlitePool, assessment: &RiskAssessment) -> Result<i64> {
    let factors = serde_json::to_string(&assessment.factors)
        .map_err(|e| DatabaseError::corrupt("risk_assessment", e))?;
    let inputs = serde_json::to_string(&assessment.inputs)
        .map_err(|e| DatabaseError::corrupt("risk_assessment", e))?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO risk_assessments
            (region_id, risk_score, risk_level, factors, inputs, computed_at, valid_until)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(assessment.region_id)
    .bind(i64::from(assessment.risk_score))
    .bind(assessment.risk_level.as_str())
    .bind(factors)
    .bind(inputs)
    .bind(format_time(assessment.computed_at))
    .bind(format_time(assessment.valid_until))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The most recent assessment for a region.
///
/// Ordered by computation time, then by insertion order.
pub async fn latest_for_region(pool: &SqlitePool, region_id: i64) -> Result<Option<RiskAssessment>> {
    let row = sqlx::query_as::<_, AssessmentRow>(
        r#"
        SELECT id, region_id, risk_score, risk_level, factors, inputs, computed_at, valid_until
        FROM risk_assessments
        WHERE region_id = ?
        ORDER BY computed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(region_id)
    .fetch_optional(pool)
    .await?;

    row.map(decode).transpose()
}

/// Assessment history for a region, newest first.
pub async fn history_for_region(
    pool: &SqlitePool,
    region_id: i64,
    limit: i64,
) -> Result<Vec<RiskAssessment>> {
    let rows = sqlx::query_as::<_, AssessmentRow>(
        r#"
        SELECT id, region_id, risk_score, risk_level, factors, inputs, computed_at, valid_until
        FROM risk_assessments
        WHERE region_id = ?
        ORDER BY computed_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(region_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(decode).collect()
}

fn decode(row: AssessmentRow) -> Result<RiskAssessment> {
    let corrupt = |e: String| DatabaseError::corrupt("risk_assessment", format!("id {}: {}", row.id, e));

    Ok(RiskAssessment {
        region_id: row.region_id,
        risk_score: u8::try_from(row.risk_score).map_err(|e| corrupt(e.to_string()))?,
        risk_level: row.risk_level.parse().map_err(|e: flood_core::ParseEnumError| corrupt(e.to_string()))?,
        factors: serde_json::from_str(&row.factors).map_err(|e| corrupt(e.to_string()))?,
        computed_at: parse_time("risk_assessment", &row.computed_at)?,
        valid_until: parse_time("risk_assessment", &row.valid_until)?,
        inputs: serde_json::from_str(&row.inputs).map_err(|e| corrupt(e.to_string()))?,
    })
}
