//! Coarse system health derived from the active alert set.

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, Severity};
use crate::types::Timestamp;

/// Active-alert count above which the system is considered degraded even
/// without any high-severity alert.
const WARNING_ALERT_COUNT: usize = 5;

/// Overall health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Healthy,
    Warning,
    Critical,
}

/// Snapshot of the current health verdict, reported at the status boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: SystemStatus,
    pub active_alert_count: usize,
    /// Timestamp of the newest metrics snapshot, if any was captured yet.
    pub last_snapshot_at: Option<Timestamp>,
    pub uptime_secs: u64,
}

/// Derive the coarse status from the currently open alerts.
///
/// `critical` wins over everything; `warning` when any open alert is high
/// severity or more than five alerts are open at once.
pub fn derive_status(open_alerts: &[Alert]) -> SystemStatus {
    if open_alerts.iter().any(|a| a.severity == Severity::Critical) {
        SystemStatus::Critical
    } else if open_alerts.iter().any(|a| a.severity == Severity::High)
        || open_alerts.len() > WARNING_ALERT_COUNT
    {
        SystemStatus::Warning
    } else {
        SystemStatus::Healthy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{default_rules, Alert};

    fn alert_with_severity(severity: Severity) -> Alert {
        let mut rule = default_rules().remove(0);
        rule.severity = severity;
        Alert::triggered(&rule, 99.0, chrono::Utc::now())
    }

    #[test]
    fn no_alerts_is_healthy() {
        assert_eq!(derive_status(&[]), SystemStatus::Healthy);
    }

    #[test]
    fn low_severity_alerts_stay_healthy() {
        let alerts = vec![alert_with_severity(Severity::Low), alert_with_severity(Severity::Medium)];
        assert_eq!(derive_status(&alerts), SystemStatus::Healthy);
    }

    #[test]
    fn high_severity_alert_degrades_to_warning() {
        let alerts = vec![alert_with_severity(Severity::High)];
        assert_eq!(derive_status(&alerts), SystemStatus::Warning);
    }

    #[test]
    fn many_low_alerts_degrade_to_warning() {
        let alerts: Vec<_> = (0..6).map(|_| alert_with_severity(Severity::Low)).collect();
        assert_eq!(derive_status(&alerts), SystemStatus::Warning);
    }

    #[test]
    fn any_critical_alert_wins() {
        let alerts = vec![
            alert_with_severity(Severity::Low),
            alert_with_severity(Severity::Critical),
        ];
        assert_eq!(derive_status(&alerts), SystemStatus::Critical);
    }
}
