//! Route handlers for the admin web interface.

pub mod alerts;
pub mod health;
pub mod recipients;
pub mod regions;
pub mod stats;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Dashboard
        .route("/api/stats", get(stats::stats))
        .route("/api/regions", get(regions::list).post(regions::create))
        .route("/api/regions/:id/risk", get(regions::latest_risk))
        .route("/api/regions/:id/assess", post(regions::assess))
        // Alerts
        .route("/api/alerts/send", post(alerts::send))
        .route("/api/alerts/history", get(alerts::history))
        // Directory maintenance
        .route("/api/recipients", post(recipients::create))
        .route("/api/recipients/:id/active", put(recipients::set_active))
}
