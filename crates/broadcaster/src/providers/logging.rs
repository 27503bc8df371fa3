use async_trait::async_trait;
use flood_core::{Channel, ChannelProvider, DeliveryResult};
use tracing::info;

/// Mock channel: logs every send and reports success.
///
/// Used when `MOCK_CHANNELS` is on, so operators can rehearse broadcasts
/// without a messaging account.
pub struct LoggingProvider {
    channel: Channel,
}

impl LoggingProvider {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelProvider for LoggingProvider {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, address: &str, message: &str) -> DeliveryResult {
        info!(
            channel = %self.channel,
            to = %address,
            chars = message.chars().count(),
            "[mock] Alert sent"
        );
        DeliveryResult::Sent
    }
}
