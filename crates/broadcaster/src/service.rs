//! Broadcast orchestration: validate, resolve, dispatch, log.

use std::sync::Arc;

use chrono::Utc;
use flood_core::{AlertLog, AlertLogEntry, BroadcastRequest, DeliveryReport, RecipientResolver};
use tokio::sync::watch;
use tracing::{error, info};

use crate::dispatch::Dispatcher;
use crate::error::BroadcastError;

/// Result of one broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastOutcome {
    pub report: DeliveryReport,
    /// Alert log id, or `None` if the log write failed.
    pub log_id: Option<i64>,
}

/// Runs operator broadcasts end to end.
pub struct AlertService {
    resolver: Arc<dyn RecipientResolver>,
    dispatcher: Dispatcher,
    log: Arc<dyn AlertLog>,
}

impl AlertService {
    pub fn new(
        resolver: Arc<dyn RecipientResolver>,
        dispatcher: Dispatcher,
        log: Arc<dyn AlertLog>,
    ) -> Self {
        Self {
            resolver,
            dispatcher,
            log,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Broadcast to every recipient of the request's region.
    pub async fn broadcast(
        &self,
        request: BroadcastRequest,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let (_keep_open, cancel) = watch::channel(false);
        self.broadcast_with_cancel(request, cancel).await
    }

    /// Broadcast, stopping new sends once `cancel` turns true.
    ///
    /// Fails only on an invalid request or a directory failure. Once sends
    /// start, a report is always returned and the alert log is always
    /// written, including after cancellation.
    pub async fn broadcast_with_cancel(
        &self,
        request: BroadcastRequest,
        cancel: watch::Receiver<bool>,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        request.validate()?;

        let recipients = self.resolver.resolve(request.region_id).await.map_err(|e| {
            error!(region_id = request.region_id, error = %e, "Recipient lookup failed");
            e
        })?;

        info!(
            region_id = request.region_id,
            risk_level = %request.risk_level,
            issued_by = %request.issued_by,
            recipients = recipients.len(),
            "Starting broadcast"
        );

        let report = self
            .dispatcher
            .broadcast_with_cancel(
                request.region_id,
                &request.message,
                request.risk_level,
                &recipients,
                cancel,
            )
            .await;

        let entry = AlertLogEntry::from_report(&request, &report, Utc::now());
        let log_id = match self.log.append(&entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(
                    region_id = request.region_id,
                    broadcast_id = %report.broadcast_id,
                    error = %e,
                    "Failed to write alert log"
                );
                None
            }
        };

        Ok(BroadcastOutcome { report, log_id })
    }
}
