//! Broadcast configuration.

use std::time::Duration;

/// Fan-out settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum sends in flight at once, across all channels.
    pub concurrency: usize,
    /// Signature line appended to every alert.
    pub signature: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            signature: "FloodWatch".to_string(),
        }
    }
}

/// Twilio account settings shared by the SMS and WhatsApp providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number for SMS, E.164.
    pub phone_number: String,
    /// Sender number for WhatsApp, E.164 without the `whatsapp:` prefix.
    pub whatsapp_number: Option<String>,
    /// API root, overridable for tests.
    pub api_base: String,
    /// Upper bound on one Messages API call, connect through response body.
    pub request_timeout: Duration,
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: phone_number.into(),
            whatsapp_number: None,
            api_base: "https://api.twilio.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_whatsapp_number(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_number = Some(number.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the HTTP client shared by the SMS and WhatsApp providers.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }

    /// Messages resource for this account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}
