//! FloodWatch admin server.
//!
//! Wires the source adapters, risk engine, broadcaster and SQLite store
//! together and exposes them over a small JSON API.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use broadcaster::{AlertService, Dispatcher, LoggingProvider, TwilioProvider};
use database::Database;
use flood_core::{Channel, SourceAdapter};
use flood_sources::{GaugeAdapter, NowcastAdapter, RainfallHistoryAdapter};
use risk_engine::AssessmentService;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ChannelMode, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting admin web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let adapters = source_adapters(&config)?;
    if adapters.is_empty() {
        warn!("No source URLs configured; assessments need observations in the request body");
    }
    let assessments = AssessmentService::new(adapters, Arc::new(db.clone()), config.sources.clone());

    let dispatcher = build_dispatcher(&config)?;
    info!(channels = ?dispatcher.channels(), "Dispatcher ready");
    let alerts = AlertService::new(Arc::new(db.clone()), dispatcher, Arc::new(db.clone()));

    // Build application state
    let state = AppState::new(db, assessments, alerts);

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Admin web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// One adapter per configured source URL.
fn source_adapters(config: &Config) -> Result<Vec<Arc<dyn SourceAdapter>>, reqwest::Error> {
    let client = config.sources.http_client()?;
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if let Some(url) = &config.nowcast_url {
        adapters.push(Arc::new(NowcastAdapter::new(client.clone(), url.as_str())));
    }
    if let Some(url) = &config.rainfall_url {
        adapters.push(Arc::new(RainfallHistoryAdapter::new(client.clone(), url.as_str())));
    }
    if let Some(url) = &config.water_level_url {
        adapters.push(Arc::new(GaugeAdapter::new(client, url.as_str())));
    }

    info!(adapters = adapters.len(), "Source adapters configured");
    Ok(adapters)
}

/// SMS and WhatsApp providers for the configured channel mode.
fn build_dispatcher(config: &Config) -> Result<Dispatcher, reqwest::Error> {
    let dispatcher = Dispatcher::new(config.dispatch.clone());

    let dispatcher = match &config.channels {
        ChannelMode::Mock => {
            info!("MOCK_CHANNELS enabled; alerts are logged, not delivered");
            dispatcher
                .with_provider(Arc::new(LoggingProvider::new(Channel::Sms)))
                .with_provider(Arc::new(LoggingProvider::new(Channel::Whatsapp)))
        }
        ChannelMode::Twilio(twilio) => {
            let client = twilio.http_client()?;
            info!(timeout = ?twilio.request_timeout, "Twilio channels enabled");
            dispatcher
                .with_provider(Arc::new(TwilioProvider::sms(client.clone(), twilio.clone())))
                .with_provider(Arc::new(TwilioProvider::whatsapp(client, twilio.clone())))
        }
    };
    Ok(dispatcher)
}
