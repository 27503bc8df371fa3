use async_trait::async_trait;
use flood_core::{Channel, ChannelProvider, DeliveryResult};
use serde::Deserialize;
use tracing::debug;

use crate::config::TwilioConfig;

const WHATSAPP_PREFIX: &str = "whatsapp:";

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: String,
}

/// Sends through the Twilio Messages API.
///
/// One instance per channel. The WhatsApp instance prefixes both sender and
/// recipient with `whatsapp:`.
pub struct TwilioProvider {
    client: reqwest::Client,
    config: TwilioConfig,
    channel: Channel,
}

impl TwilioProvider {
    pub fn sms(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self {
            client,
            config,
            channel: Channel::Sms,
        }
    }

    pub fn whatsapp(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self {
            client,
            config,
            channel: Channel::Whatsapp,
        }
    }

    /// The (from, to) pair for this channel.
    fn endpoints(&self, address: &str) -> Result<(String, String), String> {
        match self.channel {
            Channel::Sms => Ok((self.config.phone_number.clone(), address.to_string())),
            Channel::Whatsapp => {
                let from = self
                    .config
                    .whatsapp_number
                    .as_deref()
                    .ok_or_else(|| "WhatsApp sender number not configured".to_string())?;
                Ok((whatsapp_address(from), whatsapp_address(address)))
            }
        }
    }

    async fn post(&self, from: &str, to: &str, body: &str) -> Result<String, String> {
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("reading response failed: {}", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TwilioError>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(format!("Twilio returned {}: {}", status.as_u16(), detail));
        }

        serde_json::from_str::<TwilioMessage>(&text)
            .map(|m| m.sid)
            .map_err(|e| format!("unexpected Twilio response: {}", e))
    }
}

/// Prefix an address for WhatsApp unless it already is.
pub(crate) fn whatsapp_address(address: &str) -> String {
    let address = address.trim();
    if address.starts_with(WHATSAPP_PREFIX) {
        address.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, address)
    }
}

#[async_trait]
impl ChannelProvider for TwilioProvider {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, address: &str, message: &str) -> DeliveryResult {
        let (from, to) = match self.endpoints(address) {
            Ok(pair) => pair,
            Err(reason) => return DeliveryResult::failed(reason),
        };

        match self.post(&from, &to, message).await {
            Ok(sid) => {
                debug!(channel = %self.channel, sid = %sid, "Twilio accepted message");
                DeliveryResult::Sent
            }
            Err(reason) => DeliveryResult::failed(reason),
        }
    }
}
