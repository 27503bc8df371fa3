//! Database error types.

use flood_core::{ResolveError, StoreError};
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Input rejected before reaching the database
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Stored value could not be decoded
    #[error("corrupt {entity} record: {detail}")]
    Corrupt { entity: &'static str, detail: String },
}

impl DatabaseError {
    pub(crate) fn corrupt(entity: &'static str, detail: impl ToString) -> Self {
        DatabaseError::Corrupt {
            entity,
            detail: detail.to_string(),
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Corrupt { .. } => StoreError::Corrupt(err.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ResolveError {
    fn from(err: DatabaseError) -> Self {
        ResolveError(err.to_string())
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Map a unique-constraint violation to `AlreadyExists`.
pub(crate) fn unique_violation(entity: &'static str, id: impl Into<String>) -> impl FnOnce(sqlx::Error) -> DatabaseError {
    let id = id.into();
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists { entity, id };
            }
        }
        DatabaseError::Sqlx(e)
    }
}
