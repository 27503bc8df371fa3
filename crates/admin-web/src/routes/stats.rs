//! Dashboard headline counts.

use axum::extract::State;
use axum::Json;
use database::stats::dashboard_stats;
use database::DashboardStats;

use crate::error::Result;
use crate::state::AppState;

/// Totals for recipients and regions, plus alerts logged in the last 24 hours.
pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(dashboard_stats(state.db.pool()).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{body_json, call, get, state};

    #[tokio::test]
    async fn test_stats_on_empty_directory() {
        let state = state().await;

        let response = call(&state, get("/api/stats")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_recipients"], 0);
        assert_eq!(body["total_regions"], 0);
        assert_eq!(body["alerts_sent_24h"], 0);
    }
}
