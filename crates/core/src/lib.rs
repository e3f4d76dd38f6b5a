//! Vitalis observability domain types.
//!
//! Pure domain model for the platform observability engine — metric
//! snapshots, alert rules and their lifecycle, behavior events, and the
//! derived system status. No I/O lives here; the engine crate drives
//! sampling and evaluation, the notify crate handles delivery.

pub mod alert;
pub mod behavior;
pub mod channels;
pub mod error;
pub mod metrics;
pub mod status;
pub mod types;

pub use alert::{Alert, AlertRule, AlertStatus, ComparisonOp, Severity};
pub use behavior::{AnalyticsReport, AnalyticsWindow, BehaviorEvent};
pub use error::CoreError;
pub use metrics::{MetricKey, MetricsSnapshot};
pub use status::{StatusReport, SystemStatus};
