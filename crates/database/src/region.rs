//! Region directory operations.

use sqlx::SqlitePool;

use crate::error::{unique_violation, DatabaseError, Result};
use crate::models::{NewRegion, Region, RegionSummary};
use crate::validation::{validate_coordinates, validate_region_name};

/// Regions listed on the dashboard, at most.
pub const MAX_LISTED_REGIONS: i64 = 200;

/// Register a region.
pub async fn create_region(pool: &SqlitePool, region: &NewRegion) -> Result<Region> {
    validate_region_name(&region.name)?;
    validate_coordinates(region.latitude, region.longitude)?;

    let name = region.name.trim();
    let created = sqlx::query_as::<_, Region>(
        r#"
        INSERT INTO regions (name, state, latitude, longitude, station_id, population)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, name, state, latitude, longitude, station_id, population, created_at
        "#,
    )
    .bind(name)
    .bind(&region.state)
    .bind(region.latitude)
    .bind(region.longitude)
    .bind(&region.station_id)
    .bind(region.population)
    .fetch_one(pool)
    .await
    .map_err(unique_violation("Region", name))?;

    tracing::info!(region_id = created.id, name = %created.name, "Registered region");
    Ok(created)
}

/// Get a region by ID.
pub async fn get_region(pool: &SqlitePool, id: i64) -> Result<Region> {
    sqlx::query_as::<_, Region>(
        r#"
        SELECT id, name, state, latitude, longitude, station_id, population, created_at
        FROM regions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Region",
        id: id.to_string(),
    })
}

/// List all regions ordered by name.
pub async fn list_regions(pool: &SqlitePool) -> Result<Vec<Region>> {
    let regions = sqlx::query_as::<_, Region>(
        r#"
        SELECT id, name, state, latitude, longitude, station_id, population, created_at
        FROM regions
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(regions)
}

/// Every region with its latest assessed risk, if any.
pub async fn list_region_summaries(pool: &SqlitePool) -> Result<Vec<RegionSummary>> {
    let summaries = sqlx::query_as::<_, RegionSummary>(
        r#"
        SELECT r.id, r.name, r.state,
            (SELECT a.risk_level FROM risk_assessments a
             WHERE a.region_id = r.id
             ORDER BY a.computed_at DESC, a.id DESC LIMIT 1) AS latest_risk_level,
            (SELECT a.risk_score FROM risk_assessments a
             WHERE a.region_id = r.id
             ORDER BY a.computed_at DESC, a.id DESC LIMIT 1) AS latest_risk_score
        FROM regions r
        ORDER BY r.name
        LIMIT ?
        "#,
    )
    .bind(MAX_LISTED_REGIONS)
    .fetch_all(pool)
    .await?;

    Ok(summaries)
}
