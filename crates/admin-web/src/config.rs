//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use broadcaster::{DispatchConfig, TwilioConfig};
use flood_sources::SourceConfig;

/// How outbound alerts are delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMode {
    /// Log each send and report success.
    Mock,
    /// Deliver through Twilio.
    Twilio(TwilioConfig),
}

/// Admin web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Nowcast API base URL.
    pub nowcast_url: Option<String>,
    /// Daily rainfall API base URL.
    pub rainfall_url: Option<String>,
    /// River gauge API base URL.
    pub water_level_url: Option<String>,
    pub sources: SourceConfig,
    pub dispatch: DispatchConfig,
    pub channels: ChannelMode,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:floodwatch.db?mode=rwc` |
    /// | `NOWCAST_URL` | Nowcast API base URL | (adapter disabled) |
    /// | `RAINFALL_URL` | Daily rainfall API base URL | (adapter disabled) |
    /// | `WATER_LEVEL_URL` | River gauge API base URL | (adapter disabled) |
    /// | `SOURCE_TIMEOUT_SECS` | Per-source fetch timeout | `5` |
    /// | `FETCH_DEADLINE_SECS` | Overall fetch deadline | `8` |
    /// | `DISPATCH_CONCURRENCY` | Concurrent sends per broadcast | `8` |
    /// | `MOCK_CHANNELS` | Log sends instead of delivering | `true` |
    /// | `TWILIO_ACCOUNT_SID` | Twilio account | (required unless mock) |
    /// | `TWILIO_AUTH_TOKEN` | Twilio token | (required unless mock) |
    /// | `TWILIO_PHONE_NUMBER` | SMS sender number | (required unless mock) |
    /// | `TWILIO_WHATSAPP_NUMBER` | WhatsApp sender number | (WhatsApp sends fail) |
    /// | `TWILIO_TIMEOUT_SECS` | Per-request Twilio timeout | `10` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = var("ADMIN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            var("SQLITE_PATH").unwrap_or_else(|| "sqlite:floodwatch.db?mode=rwc".to_string());

        let per_source_timeout = Duration::from_secs(seconds(&var, "SOURCE_TIMEOUT_SECS", 5)?);
        let deadline = Duration::from_secs(seconds(&var, "FETCH_DEADLINE_SECS", 8)?);

        let concurrency = match var("DISPATCH_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber("DISPATCH_CONCURRENCY"))?,
            None => DispatchConfig::default().concurrency,
        };

        let mock = match var("MOCK_CHANNELS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool("MOCK_CHANNELS"))?,
            None => true,
        };

        let channels = if mock {
            ChannelMode::Mock
        } else {
            let sid = var("TWILIO_ACCOUNT_SID").ok_or(ConfigError::Missing("TWILIO_ACCOUNT_SID"))?;
            let token = var("TWILIO_AUTH_TOKEN").ok_or(ConfigError::Missing("TWILIO_AUTH_TOKEN"))?;
            let phone =
                var("TWILIO_PHONE_NUMBER").ok_or(ConfigError::Missing("TWILIO_PHONE_NUMBER"))?;

            let mut twilio = TwilioConfig::new(sid, token, phone);
            let timeout = seconds(&var, "TWILIO_TIMEOUT_SECS", twilio.request_timeout.as_secs())?;
            twilio = twilio.with_request_timeout(Duration::from_secs(timeout));
            if let Some(whatsapp) = var("TWILIO_WHATSAPP_NUMBER") {
                twilio = twilio.with_whatsapp_number(whatsapp);
            }
            ChannelMode::Twilio(twilio)
        };

        Ok(Self {
            addr,
            database_url,
            nowcast_url: var("NOWCAST_URL"),
            rainfall_url: var("RAINFALL_URL"),
            water_level_url: var("WATER_LEVEL_URL"),
            sources: SourceConfig::new(per_source_timeout, deadline),
            dispatch: DispatchConfig {
                concurrency,
                ..DispatchConfig::default()
            },
            channels,
        })
    }
}

fn seconds<F>(var: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidNumber(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a positive integer")]
    InvalidNumber(&'static str),

    #[error("{0} must be true or false")]
    InvalidBool(&'static str),

    #[error("{0} environment variable is required when MOCK_CHANNELS is false")]
    Missing(&'static str),
}
