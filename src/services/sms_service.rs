use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SmsOptions;
use crate::error::Result;
use crate::services::email_service::DeliveryOutcome;

const DISABLED_RESPONSE: &str = "SMS provider disabled; simulated success.";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> DeliveryOutcome;
}

#[derive(Serialize)]
struct SmsRelayMessage<'a> {
    provider: &'a str,
    from: &'a str,
    to: &'a str,
    message: &'a str,
}

#[derive(Clone)]
pub struct RelaySmsSender {
    client: Client,
    options: SmsOptions,
}

impl RelaySmsSender {
    pub fn new(options: SmsOptions, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, options })
    }
}

#[async_trait]
impl SmsSender for RelaySmsSender {
    async fn send(&self, to: &str, message: &str) -> DeliveryOutcome {
        if !self.options.enabled {
            return DeliveryOutcome::sent(DISABLED_RESPONSE);
        }

        let Some(url) = self.options.relay_url.as_deref() else {
            return DeliveryOutcome::failed("relay url not configured");
        };

        let payload = SmsRelayMessage {
            provider: &self.options.provider_name,
            from: &self.options.from_number,
            to,
            message,
        };

        let mut request = self.client.post(url).json(&payload);
        if let Some(secret) = self.options.relay_secret.as_deref() {
            request = request.header("X-Relay-Secret", secret);
        }

        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    debug!(to, provider = %self.options.provider_name, "sms relay accepted message");
                    DeliveryOutcome::sent("Sent")
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    warn!(to, status = status.as_u16(), "sms relay rejected message");
                    DeliveryOutcome::failed(format!("relay status {}: {}", status.as_u16(), body))
                }
            }
            Err(err) => {
                warn!(to, error = %err, "sms relay unreachable");
                DeliveryOutcome::failed(err.to_string())
            }
        }
    }
}
