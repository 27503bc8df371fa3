//! Error types for broadcasts.

use flood_core::{InvalidBroadcast, ResolveError};
use thiserror::Error;

/// Errors that abort a broadcast before any send is issued.
///
/// Send failures are never errors; they are counted in the report.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The request failed validation.
    #[error("invalid broadcast: {0}")]
    InvalidRequest(#[from] InvalidBroadcast),

    /// The recipient directory could not be queried.
    #[error("{0}")]
    RecipientResolution(#[from] ResolveError),
}
