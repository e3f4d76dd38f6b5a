//! Structured-log notification channel.
//!
//! The baseline channel: every deployment has it, it never fails, and it
//! keeps fired alerts visible even when no external transport is configured.

use async_trait::async_trait;
use vitalis_core::channels::CHANNEL_LOG;
use vitalis_core::Alert;

use crate::channel::{NotificationChannel, NotifyError};

/// Emits one `tracing` event per delivered alert.
#[derive(Debug, Default)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &'static str {
        CHANNEL_LOG
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        tracing::warn!(
            alert_id = %alert.id,
            rule_id = %alert.rule_id,
            metric = %alert.metric,
            severity = alert.severity.as_str(),
            current_value = alert.current_value,
            threshold = alert.threshold,
            "{}",
            alert.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalis_core::alert::default_rules;

    #[tokio::test]
    async fn log_delivery_never_fails() {
        let rule = default_rules().remove(0);
        let alert = Alert::triggered(&rule, 96.0, chrono::Utc::now());
        LogChannel.deliver(&alert).await.unwrap();
    }
}
