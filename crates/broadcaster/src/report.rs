//! Delivery report accumulation.

use std::collections::{BTreeMap, HashMap};

use flood_core::{
    Channel, ChannelTally, DeliveryFailure, DeliveryReport, DeliveryResult, RecipientId,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct RecipientProgress {
    /// Sends issued but not yet reported.
    pending: Vec<Channel>,
    reached: bool,
}

/// Accumulates send outcomes into a [`DeliveryReport`].
///
/// Owned by a single task; workers report through a channel rather than
/// touching the builder directly.
#[derive(Debug)]
pub struct ReportBuilder {
    broadcast_id: Uuid,
    recipients: HashMap<RecipientId, RecipientProgress>,
    per_channel: BTreeMap<Channel, ChannelTally>,
    failures: Vec<DeliveryFailure>,
    skipped: u32,
    cancelled: bool,
}

impl ReportBuilder {
    pub fn new(broadcast_id: Uuid) -> Self {
        Self {
            broadcast_id,
            recipients: HashMap::new(),
            per_channel: BTreeMap::new(),
            failures: Vec::new(),
            skipped: 0,
            cancelled: false,
        }
    }

    /// A send was issued to `recipient_id` on `channel`.
    pub fn issued(&mut self, recipient_id: RecipientId, channel: Channel) {
        self.per_channel.entry(channel).or_default().attempted += 1;
        self.recipients
            .entry(recipient_id)
            .or_default()
            .pending
            .push(channel);
    }

    /// A send finished.
    pub fn record(&mut self, recipient_id: RecipientId, channel: Channel, result: DeliveryResult) {
        let progress = self.recipients.entry(recipient_id).or_default();
        if let Some(pos) = progress.pending.iter().position(|c| *c == channel) {
            progress.pending.swap_remove(pos);
        }

        match result {
            DeliveryResult::Sent => {
                progress.reached = true;
                self.per_channel.entry(channel).or_default().succeeded += 1;
            }
            DeliveryResult::Failed { reason } => self.failures.push(DeliveryFailure {
                recipient_id,
                channel,
                reason,
            }),
        }
    }

    /// An active recipient was never attempted.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Whether any send was issued to `recipient_id`.
    pub fn was_attempted(&self, recipient_id: RecipientId) -> bool {
        self.recipients.contains_key(&recipient_id)
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Close the report. Sends that never reported back count as failures.
    pub fn finish(mut self) -> DeliveryReport {
        let mut lost: Vec<(RecipientId, Channel)> = self
            .recipients
            .iter()
            .flat_map(|(id, p)| p.pending.iter().map(move |c| (*id, *c)))
            .collect();
        lost.sort_unstable();
        for (recipient_id, channel) in lost {
            self.failures.push(DeliveryFailure {
                recipient_id,
                channel,
                reason: "send did not report an outcome".to_string(),
            });
        }

        DeliveryReport {
            broadcast_id: self.broadcast_id,
            attempted_count: self.recipients.len() as u32,
            succeeded_count: self.recipients.values().filter(|p| p.reached).count() as u32,
            skipped_count: self.skipped,
            per_channel: self.per_channel,
            failures: self.failures,
            cancelled: self.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_counts_once_across_channels() {
        let mut builder = ReportBuilder::new(Uuid::new_v4());
        builder.issued(1, Channel::Sms);
        builder.issued(1, Channel::Whatsapp);
        builder.record(1, Channel::Sms, DeliveryResult::failed("carrier rejected"));
        builder.record(1, Channel::Whatsapp, DeliveryResult::Sent);

        let report = builder.finish();
        assert_eq!(report.attempted_count, 1);
        assert_eq!(report.succeeded_count, 1);
        assert_eq!(report.per_channel[&Channel::Sms], ChannelTally { attempted: 1, succeeded: 0 });
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].reason, "carrier rejected");
    }

    #[test]
    fn test_unreported_send_is_a_failure() {
        let mut builder = ReportBuilder::new(Uuid::new_v4());
        builder.issued(4, Channel::Sms);
        builder.skip();
        builder.mark_cancelled();

        let report = builder.finish();
        assert_eq!(report.attempted_count, 1);
        assert_eq!(report.succeeded_count, 0);
        assert_eq!(report.skipped_count, 1);
        assert!(report.cancelled);
        assert_eq!(report.failures[0].reason, "send did not report an outcome");
    }
}
