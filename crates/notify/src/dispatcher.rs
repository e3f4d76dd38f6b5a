//! Alert fan-out across registered notification channels.
//!
//! The dispatcher sits between the rule engine and the delivery transports.
//! Delivery is fire-and-forget relative to rule evaluation: a channel that
//! errors or times out is logged and skipped, and never blocks or fails the
//! evaluation path or the remaining channels.

use std::collections::HashMap;
use std::sync::Arc;

use vitalis_core::Alert;

use crate::channel::NotificationChannel;

/// Registry of delivery channels, keyed by channel name.
#[derive(Default)]
pub struct NotificationDispatcher {
    channels: HashMap<&'static str, Arc<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    /// Create an empty dispatcher with no channels registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel under its own name, replacing any previous
    /// registration with the same name.
    pub fn register(&mut self, channel: Arc<dyn NotificationChannel>) {
        self.channels.insert(channel.name(), channel);
    }

    /// Names of all registered channels.
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.keys().copied().collect()
    }

    /// Deliver `alert` to every channel named in `channel_names`.
    ///
    /// Channels are attempted independently and in order; one channel's
    /// failure is logged and does not prevent attempts on the rest. Unknown
    /// channel names are logged as a warning and skipped. This method never
    /// returns an error.
    pub async fn dispatch(&self, alert: &Alert, channel_names: &[String]) {
        for name in channel_names {
            let Some(channel) = self.channels.get(name.as_str()) else {
                tracing::warn!(
                    channel = %name,
                    rule_id = %alert.rule_id,
                    "Unknown notification channel, skipping"
                );
                continue;
            };

            if let Err(e) = channel.deliver(alert).await {
                tracing::error!(
                    channel = %name,
                    alert_id = %alert.id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
