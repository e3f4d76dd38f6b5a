//! Well-known notification channel name constants.
//!
//! These must match the names the dispatcher registers its channels under
//! and the channel lists carried by alert rules.

/// Structured log line via `tracing` — always available, never fails.
pub const CHANNEL_LOG: &str = "log";

/// HTTP POST of the alert payload to an external endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";

/// Plain-text alert email delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";
