//! Alert notification channels and fan-out dispatch.
//!
//! This crate delivers fired alerts to the outside world:
//!
//! - [`NotificationChannel`] — the delivery seam implemented per transport.
//! - [`LogChannel`] — structured log line, always available.
//! - [`WebhookChannel`] — HTTP POST with retry.
//! - [`EmailChannel`] — plain-text SMTP mail via `lettre`.
//! - [`NotificationDispatcher`] — fans one alert out to the channels named
//!   by its rule, isolating per-channel failures.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod log;
pub mod webhook;

pub use channel::{NotificationChannel, NotifyError};
pub use dispatcher::NotificationDispatcher;
pub use email::{EmailChannel, EmailConfig};
pub use log::LogChannel;
pub use webhook::WebhookChannel;
