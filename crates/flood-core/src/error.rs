//! Error types shared across the pipeline.

use thiserror::Error;

use crate::observation::SourceKind;

/// One source adapter could not produce an observation.
///
/// Recoverable: the aggregator treats the source as missing data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} source unavailable: {reason}")]
pub struct SourceUnavailable {
    pub kind: SourceKind,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// The adapter did not answer within its time budget.
    pub fn timed_out(kind: SourceKind) -> Self {
        Self::new(kind, "timed out")
    }
}

/// The recipient directory could not be queried.
#[derive(Debug, Clone, Error)]
#[error("recipient lookup failed: {0}")]
pub struct ResolveError(pub String);

/// Errors surfaced by the assessment store and alert log.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// A broadcast request failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBroadcast {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("message is too long ({actual} chars, max {max})")]
    MessageTooLong { max: usize, actual: usize },

    #[error("issuer cannot be empty")]
    MissingIssuer,
}

/// A string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
