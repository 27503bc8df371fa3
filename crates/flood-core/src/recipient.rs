//! Recipients, channels, and the collaborator traits that serve them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ParseEnumError, ResolveError};
use crate::{RecipientId, RegionId};

/// A notification medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Whatsapp,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Sms, Channel::Whatsapp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            other => Err(ParseEnumError {
                kind: "channel",
                value: other.to_string(),
            }),
        }
    }
}

/// A person subscribed to alerts for a region.
///
/// Owned by the external directory; the pipeline only reads a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    /// Phone number or other contact address.
    pub address: String,
    pub region_id: RegionId,
    pub channels: BTreeSet<Channel>,
    pub active: bool,
}

impl Recipient {
    pub fn new(
        id: RecipientId,
        address: impl Into<String>,
        region_id: RegionId,
        channels: impl IntoIterator<Item = Channel>,
    ) -> Self {
        Self {
            id,
            address: address.into(),
            region_id,
            channels: channels.into_iter().collect(),
            active: true,
        }
    }

    /// Mark the recipient inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Outcome of one send attempt on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Sent,
    Failed { reason: String },
}

impl DeliveryResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        DeliveryResult::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryResult::Sent)
    }
}

/// Sends a single message to a single address on one channel.
///
/// Implementations convert every transport error into
/// [`DeliveryResult::Failed`]; they never return an error type.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// The channel this provider serves.
    fn channel(&self) -> Channel;

    /// Send `message` to `address`.
    async fn send(&self, address: &str, message: &str) -> DeliveryResult;
}

/// Read-only lookup of a region's recipients.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// All recipients belonging to the region, active or not.
    async fn resolve(&self, region_id: RegionId) -> Result<Vec<Recipient>, ResolveError>;
}
