//! Status report assembly.
//!
//! The verdict derivation itself lives in `vitalis_core::status`; this
//! module just assembles the report from engine state.

use std::time::Instant;

use vitalis_core::status::derive_status;
use vitalis_core::types::Timestamp;
use vitalis_core::{Alert, StatusReport};

/// Build a [`StatusReport`] from the current open alerts and store state.
pub fn build_report(
    open_alerts: &[Alert],
    last_snapshot_at: Option<Timestamp>,
    started_at: Instant,
) -> StatusReport {
    StatusReport {
        status: derive_status(open_alerts),
        active_alert_count: open_alerts.len(),
        last_snapshot_at,
        uptime_secs: started_at.elapsed().as_secs(),
    }
}
