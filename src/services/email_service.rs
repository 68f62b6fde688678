use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EmailOptions;
use crate::error::Result;

const DISABLED_RESPONSE: &str = "Email delivery disabled; simulated success.";

/// Result of one provider hand-off. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub response: String,
}

impl DeliveryOutcome {
    pub fn sent(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
        }
    }

    pub fn failed(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DeliveryOutcome;
}

#[derive(Serialize)]
struct EmailRelayMessage<'a> {
    from_address: &'a str,
    from_name: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Hands e-mail to an HTTP relay that owns the SMTP session.
#[derive(Clone)]
pub struct RelayEmailSender {
    client: Client,
    options: EmailOptions,
}

impl RelayEmailSender {
    pub fn new(options: EmailOptions, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, options })
    }
}

#[async_trait]
impl EmailSender for RelayEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DeliveryOutcome {
        if !self.options.enabled {
            return DeliveryOutcome::sent(DISABLED_RESPONSE);
        }

        let Some(url) = self.options.relay_url.as_deref() else {
            return DeliveryOutcome::failed("relay url not configured");
        };

        let message = EmailRelayMessage {
            from_address: &self.options.from_address,
            from_name: &self.options.from_name,
            to,
            subject,
            body,
        };

        let mut request = self.client.post(url).json(&message);
        if let Some(secret) = self.options.relay_secret.as_deref() {
            request = request.header("X-Relay-Secret", secret);
        }

        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    debug!(to, "email relay accepted message");
                    DeliveryOutcome::sent("Sent")
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    warn!(to, status = status.as_u16(), "email relay rejected message");
                    DeliveryOutcome::failed(format!("relay status {}: {}", status.as_u16(), body))
                }
            }
            Err(err) => {
                warn!(to, error = %err, "email relay unreachable");
                DeliveryOutcome::failed(err.to_string())
            }
        }
    }
}
