//! Alert rules and the alert lifecycle.
//!
//! An [`AlertRule`] is a configured threshold condition over one
//! [`MetricKey`]; an [`Alert`] is a concrete, time-bounded instance of that
//! condition being true. The rule engine guarantees at most one non-resolved
//! alert per rule at any time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::metrics::MetricKey;
use crate::types::Timestamp;

/// Tolerance for floating-point equality in [`ComparisonOp::Eq`].
const EQ_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a rule violation, ordered from least to most severe.
///
/// Used both for alert prioritization and for deriving the overall system
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// String representation matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// ComparisonOp
// ---------------------------------------------------------------------------

/// Comparison operator applied as `op(observed_value, threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
}

impl ComparisonOp {
    /// Evaluate the operator against a threshold.
    ///
    /// `Eq` compares within a small epsilon; exact float equality on sampled
    /// metrics would essentially never hold.
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOp::Gt => value > threshold,
            ComparisonOp::Lt => value < threshold,
            ComparisonOp::Eq => (value - threshold).abs() < EQ_EPSILON,
            ComparisonOp::Gte => value >= threshold,
            ComparisonOp::Lte => value <= threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// AlertRule
// ---------------------------------------------------------------------------

/// A configured threshold condition over a single metric.
///
/// Rules are created at startup (defaults plus configuration) and are not
/// mutated by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    /// Unique rule identifier.
    pub id: String,
    /// Human-readable rule name, used in alert messages.
    pub name: String,
    /// The metric this rule watches.
    pub metric: MetricKey,
    /// Comparison applied as `op(value, threshold)`.
    pub op: ComparisonOp,
    pub threshold: f64,
    /// Minimum continuous-violation time before the rule fires.
    /// `0` fires on the first violating sample.
    #[serde(default)]
    pub duration_secs: u64,
    pub severity: Severity,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Notification channel names to fan the alert out to.
    #[serde(default)]
    pub channels: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl AlertRule {
    /// Validate rule configuration.
    ///
    /// Returns a `CoreError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Validation("rule id must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "rule {} must have a non-empty name",
                self.id
            )));
        }
        if !self.threshold.is_finite() {
            return Err(CoreError::Validation(format!(
                "rule {} threshold must be finite, got {}",
                self.id, self.threshold
            )));
        }
        Ok(())
    }
}

/// The built-in rule set, active unless overridden by configuration.
///
/// All defaults fire immediately (`duration_secs = 0`) and deliver to the
/// log channel only; deployments add webhook/email channels per rule.
pub fn default_rules() -> Vec<AlertRule> {
    let rule = |id: &str, name: &str, metric, op, threshold, severity| AlertRule {
        id: id.to_string(),
        name: name.to_string(),
        metric,
        op,
        threshold,
        duration_secs: 0,
        severity,
        enabled: true,
        channels: vec![crate::channels::CHANNEL_LOG.to_string()],
    };

    vec![
        rule(
            "high-memory-usage",
            "High memory usage",
            MetricKey::MemoryPercentage,
            ComparisonOp::Gt,
            85.0,
            Severity::High,
        ),
        rule(
            "slow-api-responses",
            "Slow API responses",
            MetricKey::ApiAvgResponseTime,
            ComparisonOp::Gt,
            1000.0,
            Severity::Medium,
        ),
        rule(
            "high-error-rate",
            "High API error rate",
            MetricKey::ApiErrorRate,
            ComparisonOp::Gt,
            5.0,
            Severity::High,
        ),
        rule(
            "db-connection-pressure",
            "Database connection pressure",
            MetricKey::DbActiveConnections,
            ComparisonOp::Gt,
            50.0,
            Severity::Medium,
        ),
        rule(
            "low-cache-hit-rate",
            "Low cache hit rate",
            MetricKey::CacheHitRate,
            ComparisonOp::Lt,
            50.0,
            Severity::Low,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// Lifecycle state of an alert.
///
/// `Acknowledged` is a sub-state of not-yet-resolved: an acknowledged alert
/// still counts against the one-active-alert-per-rule deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// One concrete violation of an alert rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// The rule that produced this alert (by identifier, never by reference).
    pub rule_id: String,
    pub metric: MetricKey,
    /// The observed value that triggered the alert.
    pub current_value: f64,
    pub threshold: f64,
    pub severity: Severity,
    pub message: String,
    pub triggered_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub status: AlertStatus,
}

impl Alert {
    /// Build a fresh `Active` alert for a violated rule.
    pub fn triggered(rule: &AlertRule, current_value: f64, at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_id: rule.id.clone(),
            metric: rule.metric,
            current_value,
            threshold: rule.threshold,
            severity: rule.severity,
            message: format!(
                "{}: {} is {:.2} (threshold {:.2})",
                rule.name, rule.metric, current_value, rule.threshold
            ),
            triggered_at: at,
            resolved_at: None,
            status: AlertStatus::Active,
        }
    }

    /// Whether the alert has not yet been resolved (active or acknowledged).
    pub fn is_open(&self) -> bool {
        self.status != AlertStatus::Resolved
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
