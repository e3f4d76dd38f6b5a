//! Webhook notification channel with exponential-backoff retry.
//!
//! Sends the JSON-encoded alert to an external URL via HTTP POST. Failed
//! attempts are retried up to three times with exponential backoff
//! (1 s, 2 s, 4 s) before the delivery is reported as failed.

use std::time::Duration;

use async_trait::async_trait;
use vitalis_core::channels::CHANNEL_WEBHOOK;
use vitalis_core::Alert;

use crate::channel::{NotificationChannel, NotifyError};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers alerts to an external webhook endpoint.
pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    /// Create a channel posting to `url`, with a pre-configured HTTP client.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        CHANNEL_WEBHOOK
    }

    /// Deliver an alert payload with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "alert_id": alert.id,
            "rule_id": alert.rule_id,
            "metric": alert.metric,
            "severity": alert.severity,
            "current_value": alert.current_value,
            "threshold": alert.threshold,
            "message": alert.message,
            "triggered_at": alert.triggered_at,
        });

        let mut last_err: Option<NotifyError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "Webhook delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
