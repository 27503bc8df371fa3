//! Flood risk scoring for FloodWatch.
//!
//! This crate turns observations into a bounded risk score:
//!
//! - [`assess`] / [`assess_at`] - The risk aggregator (pure, deterministic)
//! - [`recommend`] - Prioritized actions derived from the same observations
//! - [`AssessmentService`] - Fetch, expire, score, persist
//!
//! # Architecture
//!
//! ```text
//! FetchTarget
//!      ↓
//! collect_observations (flood-sources, concurrent, deadline-bounded)
//!      ↓
//! drop expired observations
//!      ↓
//! assess ──────────► RiskAssessment ──► AssessmentStore
//!      ↘
//!       recommend ──► Vec<String>
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use flood_core::{Metric, Observation, RiskLevel, SourceKind};
//!
//! let now = Utc::now();
//! let nowcast = Observation::new(SourceKind::Nowcast, "region-1", now, now + Duration::hours(6))
//!     .with_metric(Metric::Rainfall6h, 90.0);
//!
//! let assessment = risk_engine::assess(1, &[nowcast.clone()]).unwrap();
//! assert_eq!(assessment.risk_score, 40);
//! assert_eq!(assessment.risk_level, RiskLevel::Low);
//!
//! let actions = risk_engine::recommend(&[nowcast]);
//! assert_eq!(actions[0], "Issue severe weather warnings");
//! ```

mod aggregator;
mod error;
mod recommend;
pub mod scoring;
mod service;

pub use aggregator::{assess, assess_at};
pub use error::AssessmentError;
pub use recommend::recommend;
pub use service::{AssessmentOutcome, AssessmentService};
