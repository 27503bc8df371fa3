//! Broadcast requests, delivery reports, and alert log entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidBroadcast;
use crate::recipient::Channel;
use crate::risk::RiskLevel;
use crate::{RecipientId, RegionId};

/// Maximum operator message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 300;

/// An operator-triggered request to alert every recipient of a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub region_id: RegionId,
    pub risk_level: RiskLevel,
    pub message: String,
    /// Principal who issued the broadcast.
    pub issued_by: String,
}

impl BroadcastRequest {
    /// Check the message bound and issuer.
    pub fn validate(&self) -> Result<(), InvalidBroadcast> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(InvalidBroadcast::EmptyMessage);
        }

        let chars = message.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(InvalidBroadcast::MessageTooLong {
                max: MAX_MESSAGE_CHARS,
                actual: chars,
            });
        }

        if self.issued_by.trim().is_empty() {
            return Err(InvalidBroadcast::MissingIssuer);
        }

        Ok(())
    }
}

/// Attempt and success counters for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTally {
    pub attempted: u32,
    pub succeeded: u32,
}

/// One failed send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub recipient_id: RecipientId,
    pub channel: Channel,
    pub reason: String,
}

/// Outcome summary of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub broadcast_id: Uuid,
    /// Recipients for whom at least one send was issued.
    pub attempted_count: u32,
    /// Recipients reached on at least one channel.
    pub succeeded_count: u32,
    /// Active recipients never attempted (no usable channel, or cancelled first).
    pub skipped_count: u32,
    pub per_channel: BTreeMap<Channel, ChannelTally>,
    pub failures: Vec<DeliveryFailure>,
    /// The broadcast was cancelled before every send was issued.
    pub cancelled: bool,
}

/// Audit record of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub region_id: RegionId,
    pub message: String,
    pub risk_level: RiskLevel,
    pub attempted_count: u32,
    pub succeeded_count: u32,
    pub per_channel: BTreeMap<Channel, ChannelTally>,
    pub issued_by: String,
    pub created_at: DateTime<Utc>,
}

impl AlertLogEntry {
    /// Build the log entry for a finished broadcast.
    pub fn from_report(
        request: &BroadcastRequest,
        report: &DeliveryReport,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            region_id: request.region_id,
            message: request.message.trim().to_string(),
            risk_level: request.risk_level,
            attempted_count: report.attempted_count,
            succeeded_count: report.succeeded_count,
            per_channel: report.per_channel.clone(),
            issued_by: request.issued_by.clone(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> BroadcastRequest {
        BroadcastRequest {
            region_id: 1,
            risk_level: RiskLevel::High,
            message: message.to_string(),
            issued_by: "ops@district".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_bounded_message() {
        assert!(request("River rising, move to higher ground").validate().is_ok());
        assert!(request(&"a".repeat(MAX_MESSAGE_CHARS)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        assert_eq!(request("   ").validate(), Err(InvalidBroadcast::EmptyMessage));
        assert_eq!(
            request(&"a".repeat(MAX_MESSAGE_CHARS + 1)).validate(),
            Err(InvalidBroadcast::MessageTooLong {
                max: MAX_MESSAGE_CHARS,
                actual: MAX_MESSAGE_CHARS + 1
            })
        );
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 300 two-byte characters is still within the bound.
        assert!(request(&"é".repeat(MAX_MESSAGE_CHARS)).validate().is_ok());
    }

    #[test]
    fn test_validate_requires_issuer() {
        let mut req = request("evacuate");
        req.issued_by = String::new();
        assert_eq!(req.validate(), Err(InvalidBroadcast::MissingIssuer));
    }
}
