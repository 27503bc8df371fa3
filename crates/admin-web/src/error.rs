//! Error types for the admin web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use broadcaster::BroadcastError;
use database::DatabaseError;
use risk_engine::AssessmentError;
use thiserror::Error;

/// Errors that can occur in the admin web interface.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Assessment could not be produced.
    #[error("{0}")]
    Assessment(#[from] AssessmentError),

    /// Broadcast was rejected before sending.
    #[error("{0}")]
    Broadcast(#[from] BroadcastError),

    /// Nothing to show for an existing resource.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::Database(DatabaseError::NotFound { .. }) | AdminError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AdminError::Database(DatabaseError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            AdminError::Database(DatabaseError::Validation(_))
            | AdminError::Assessment(AssessmentError::InsufficientData { .. })
            | AdminError::Broadcast(BroadcastError::InvalidRequest(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdminError::Broadcast(BroadcastError::RecipientResolution(_)) => StatusCode::BAD_GATEWAY,
            AdminError::Database(_) | AdminError::Assessment(_) | AdminError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use flood_core::{InvalidBroadcast, ResolveError, StoreError};

    #[test]
    fn test_status_mapping() {
        let not_found = AdminError::Database(DatabaseError::NotFound {
            entity: "Region",
            id: "9".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let duplicate = AdminError::Database(DatabaseError::AlreadyExists {
            entity: "Recipient",
            id: "+15550001111".to_string(),
        });
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let no_data = AdminError::from(AssessmentError::InsufficientData { region_id: 1 });
        assert_eq!(no_data.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let empty = AdminError::from(BroadcastError::from(InvalidBroadcast::EmptyMessage));
        assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let directory = AdminError::from(BroadcastError::from(ResolveError("down".to_string())));
        assert_eq!(directory.status(), StatusCode::BAD_GATEWAY);

        let store = AdminError::from(AssessmentError::from(StoreError::Backend("io".to_string())));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
