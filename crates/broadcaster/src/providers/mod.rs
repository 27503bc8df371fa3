//! Channel provider implementations.

mod logging;
mod twilio;

pub use logging::LoggingProvider;
pub use twilio::TwilioProvider;
