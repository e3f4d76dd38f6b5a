//! The notification channel seam.

use async_trait::async_trait;
use vitalis_core::Alert;

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote endpoint returned a non-2xx status code.
    #[error("webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A recipient or sender address could not be parsed.
    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("email build error: {0}")]
    EmailBuild(String),
}

/// One alert delivery transport.
///
/// Implementations must be safe to call concurrently; the dispatcher holds
/// them behind `Arc` and may deliver several alerts at once.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Stable channel name used in rule `channels` lists.
    fn name(&self) -> &'static str;

    /// Deliver a single alert.
    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError>;
}
