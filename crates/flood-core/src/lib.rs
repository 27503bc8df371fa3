//! Core types and collaborator traits for FloodWatch.
//!
//! This crate provides the shared vocabulary of the risk-assessment and
//! alert-dispatch pipeline. It defines:
//!
//! - [`Observation`] - A normalized reading from one upstream feed
//! - [`RiskAssessment`] / [`RiskLevel`] - The aggregator's output for a region
//! - [`Recipient`] / [`Channel`] - Who gets notified, and how
//! - [`BroadcastRequest`] / [`DeliveryReport`] / [`AlertLogEntry`] - One broadcast, start to finish
//! - [`SourceAdapter`], [`ChannelProvider`], [`RecipientResolver`],
//!   [`AssessmentStore`], [`AlertLog`] - The seams where external collaborators plug in
//!
//! Test doubles for every collaborator live in [`testing`].
//!
//! # Example
//!
//! ```rust
//! use flood_core::{RiskLevel, Observation, Metric, SourceKind};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let obs = Observation::new(SourceKind::Nowcast, "station-1", now, now + Duration::hours(6))
//!     .with_metric(Metric::Rainfall6h, 42.0);
//!
//! assert_eq!(obs.metric(Metric::Rainfall6h), Some(42.0));
//! assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
//! ```

mod alert;
mod error;
mod observation;
mod recipient;
mod risk;
mod source;
mod store;
pub mod testing;

pub use alert::{
    AlertLogEntry, BroadcastRequest, ChannelTally, DeliveryFailure, DeliveryReport,
    MAX_MESSAGE_CHARS,
};
pub use error::{InvalidBroadcast, ParseEnumError, ResolveError, SourceUnavailable, StoreError};
pub use observation::{Metric, Observation, SourceKind, Unit};
pub use recipient::{Channel, ChannelProvider, DeliveryResult, Recipient, RecipientResolver};
pub use risk::{clamp_score, RiskAssessment, RiskLevel, ASSESSMENT_HORIZON_HOURS};
pub use source::{FetchTarget, SourceAdapter};
pub use store::{AlertLog, AssessmentStore};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Identifier of a region in the directory.
pub type RegionId = i64;

/// Identifier of a recipient in the directory.
pub type RecipientId = i64;
