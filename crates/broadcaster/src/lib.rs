//! Flood alert broadcasting for FloodWatch.
//!
//! This crate fans one operator alert out to every recipient of a region,
//! over each channel the recipient enabled, and reports what happened.
//!
//! - [`AlertService`] - Validate, resolve recipients, dispatch, write the alert log
//! - [`Dispatcher`] - Bounded-concurrency fan-out with cooperative cancellation
//! - [`TwilioProvider`] - SMS and WhatsApp via the Twilio REST API
//! - [`LoggingProvider`] - Mock channel that logs and reports success
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use broadcaster::{AlertService, DispatchConfig, Dispatcher, LoggingProvider};
//! use flood_core::testing::{MemoryAlertLog, StaticResolver};
//! use flood_core::{BroadcastRequest, Channel, Recipient, RiskLevel};
//!
//! # async fn example() -> Result<(), broadcaster::BroadcastError> {
//! let dispatcher = Dispatcher::new(DispatchConfig::default())
//!     .with_provider(Arc::new(LoggingProvider::new(Channel::Sms)));
//!
//! let resolver = StaticResolver::new(vec![Recipient::new(1, "+911234567890", 7, [Channel::Sms])]);
//! let service = AlertService::new(Arc::new(resolver), dispatcher, Arc::new(MemoryAlertLog::new()));
//!
//! let outcome = service
//!     .broadcast(BroadcastRequest {
//!         region_id: 7,
//!         risk_level: RiskLevel::High,
//!         message: "Move to higher ground".to_string(),
//!         issued_by: "district-control".to_string(),
//!     })
//!     .await?;
//! println!("reached {} recipients", outcome.report.succeeded_count);
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod providers;
mod report;
mod service;
mod template;

pub use config::{DispatchConfig, TwilioConfig};
pub use dispatch::Dispatcher;
pub use error::BroadcastError;
pub use providers::{LoggingProvider, TwilioProvider};
pub use report::ReportBuilder;
pub use service::{AlertService, BroadcastOutcome};
pub use template::render_alert;
