//! Notification fan-out.

use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use flood_core::{
    Channel, ChannelProvider, DeliveryReport, DeliveryResult, Recipient, RecipientId, RegionId,
    RiskLevel,
};
use futures::FutureExt;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DispatchConfig;
use crate::report::ReportBuilder;
use crate::template::render_alert;

struct SendOutcome {
    recipient_id: RecipientId,
    channel: Channel,
    result: DeliveryResult,
}

/// Delivers one rendered alert to a recipient set.
///
/// Every active recipient gets at most one send per enabled channel. Sends
/// run as spawned tasks, at most `concurrency` at a time, and report back
/// over an mpsc channel to the single task that owns the report.
pub struct Dispatcher {
    providers: BTreeMap<Channel, Arc<dyn ChannelProvider>>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            providers: BTreeMap::new(),
            config,
        }
    }

    /// Register the provider for its channel, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn ChannelProvider>) -> Self {
        self.providers.insert(provider.channel(), provider);
        self
    }

    /// Channels with a registered provider.
    pub fn channels(&self) -> Vec<Channel> {
        self.providers.keys().copied().collect()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Broadcast to `recipients` and wait for every send.
    pub async fn broadcast(
        &self,
        region_id: RegionId,
        message: &str,
        risk_level: RiskLevel,
        recipients: &[Recipient],
    ) -> DeliveryReport {
        let (_keep_open, cancel) = watch::channel(false);
        self.broadcast_with_cancel(region_id, message, risk_level, recipients, cancel)
            .await
    }

    /// Broadcast, stopping early once `cancel` turns true.
    ///
    /// After cancellation no new send is issued. Sends already running
    /// finish and are counted; recipients never reached are skipped.
    pub async fn broadcast_with_cancel(
        &self,
        region_id: RegionId,
        message: &str,
        risk_level: RiskLevel,
        recipients: &[Recipient],
        mut cancel: watch::Receiver<bool>,
    ) -> DeliveryReport {
        let mut builder = ReportBuilder::new(Uuid::new_v4());
        let text: Arc<str> = Arc::from(render_alert(risk_level, message, &self.config.signature));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<SendOutcome>();

        let mut seen = HashSet::new();
        let targets: Vec<&Recipient> = recipients
            .iter()
            .filter(|r| r.active)
            .filter(|r| seen.insert(r.id))
            .collect();

        'recipients: for (index, recipient) in targets.iter().enumerate() {
            let channels: Vec<(Channel, Arc<dyn ChannelProvider>)> = recipient
                .channels
                .iter()
                .filter_map(|c| self.providers.get(c).map(|p| (*c, p.clone())))
                .collect();

            if channels.is_empty() {
                debug!(recipient_id = recipient.id, "No usable channel for recipient");
                builder.skip();
                continue;
            }

            for (channel, provider) in channels {
                let permit = tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel) => None,
                    permit = semaphore.clone().acquire_owned() => permit.ok(),
                };

                let Some(permit) = permit else {
                    builder.mark_cancelled();
                    let unreached = targets[index..]
                        .iter()
                        .filter(|r| !builder.was_attempted(r.id))
                        .count();
                    for _ in 0..unreached {
                        builder.skip();
                    }
                    warn!(region_id, unreached, "Broadcast cancelled, no further sends issued");
                    break 'recipients;
                };

                builder.issued(recipient.id, channel);

                let tx = tx.clone();
                let text = text.clone();
                let address = recipient.address.clone();
                let recipient_id = recipient.id;
                tokio::spawn(async move {
                    let result = AssertUnwindSafe(provider.send(&address, &text))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| DeliveryResult::failed("provider panicked"));
                    drop(permit);
                    let _ = tx.send(SendOutcome {
                        recipient_id,
                        channel,
                        result,
                    });
                });
            }
        }

        drop(tx);
        while let Some(outcome) = rx.recv().await {
            if let DeliveryResult::Failed { reason } = &outcome.result {
                warn!(
                    recipient_id = outcome.recipient_id,
                    channel = %outcome.channel,
                    reason = %reason,
                    "Alert send failed"
                );
            }
            builder.record(outcome.recipient_id, outcome.channel, outcome.result);
        }

        let report = builder.finish();
        info!(
            region_id,
            broadcast_id = %report.broadcast_id,
            attempted = report.attempted_count,
            succeeded = report.succeeded_count,
            skipped = report.skipped_count,
            cancelled = report.cancelled,
            "Broadcast complete"
        );
        report
    }
}

/// Resolves once the flag turns true. A dropped sender never cancels.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        std::future::pending::<()>().await;
    }
}
