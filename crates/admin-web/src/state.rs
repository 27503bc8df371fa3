//! Application state shared across handlers.

use std::sync::Arc;

use broadcaster::AlertService;
use database::Database;
use risk_engine::AssessmentService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Fetch, score and persist.
    pub assessments: Arc<AssessmentService>,
    /// Resolve, dispatch and log.
    pub alerts: Arc<AlertService>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, assessments: AssessmentService, alerts: AlertService) -> Self {
        Self {
            db,
            assessments: Arc::new(assessments),
            alerts: Arc::new(alerts),
        }
    }
}
