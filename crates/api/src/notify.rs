//! Outbound forwarding of contact messages to the bot webhook.

use std::time::Duration;

use common::ContactMessage;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts stored contact messages to `BOT_WEBHOOK_URL`, when configured.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    /// Fails when the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(webhook_url: Option<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: None,
        }
    }

    /// Forwards a message. Failures are logged and otherwise ignored.
    #[tracing::instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn forward_contact(&self, message: &ContactMessage) {
        let Some(url) = &self.webhook_url else {
            return;
        };

        let payload = serde_json::json!({
            "type": "contact_message",
            "message": message,
        });

        let result = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        let outcome = match result {
            Ok(_) => {
                tracing::info!("contact message forwarded");
                "delivered"
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to forward contact message");
                "failed"
            }
        };
        metrics::counter!("contact_forward_total", "outcome" => outcome).increment(1);
    }
}
