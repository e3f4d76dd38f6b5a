//! Email notification channel via SMTP.
//!
//! [`EmailChannel`] wraps the `lettre` async SMTP transport to send
//! plain-text alert emails. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns
//! `None` and the channel should not be registered.

use async_trait::async_trait;
use vitalis_core::channels::CHANNEL_EMAIL;
use vitalis_core::Alert;

use crate::channel::{NotificationChannel, NotifyError};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "alerts@vitalis.local";

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMTP alert email channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Address alert mails are delivered to.
    pub to_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` or `ALERT_EMAIL_TO` is not set,
    /// signalling that email delivery is not configured and should be
    /// skipped.
    ///
    /// | Variable         | Required | Default                 |
    /// |------------------|----------|-------------------------|
    /// | `SMTP_HOST`      | yes      | —                       |
    /// | `ALERT_EMAIL_TO` | yes      | —                       |
    /// | `SMTP_PORT`      | no       | `587`                   |
    /// | `SMTP_FROM`      | no       | `alerts@vitalis.local`  |
    /// | `SMTP_USER`      | no       | —                       |
    /// | `SMTP_PASSWORD`  | no       | —                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        let to_address = std::env::var("ALERT_EMAIL_TO").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            to_address,
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailChannel
// ---------------------------------------------------------------------------

/// Sends plain-text alert emails via SMTP.
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    /// Create a new email channel with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        CHANNEL_EMAIL
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let subject = format!("[Vitalis {}] {}", alert.severity.as_str(), alert.rule_id);
        let body = format!(
            "Alert: {}\nMetric: {}\nObserved: {:.2} (threshold {:.2})\nTriggered: {}\n",
            alert.message, alert.metric, alert.current_value, alert.threshold, alert.triggered_at
        );

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.to_address.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::EmailBuild(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(
            to = %self.config.to_address,
            alert_id = %alert.id,
            "Alert email sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn email_build_error_display() {
        let err = NotifyError::EmailBuild("missing body".to_string());
        assert_eq!(err.to_string(), "email build error: missing body");
    }

    #[test]
    fn address_error_display() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = NotifyError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("email address parse error"));
    }
}
