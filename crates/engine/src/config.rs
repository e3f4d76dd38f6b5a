//! Engine configuration loaded from environment variables.

use std::time::Duration;

/// Engine configuration.
///
/// All fields have defaults suitable for local development; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between sampler ticks.
    pub sample_interval: Duration,
    /// Maximum number of snapshots kept in the time-series store.
    pub snapshot_capacity: usize,
    /// Maximum number of behavior events kept in the event log.
    pub behavior_capacity: usize,
    /// Snapshots older than this are purged by cleanup.
    pub snapshot_retention: chrono::Duration,
    /// Resolved alerts older than this are purged by cleanup.
    pub resolved_alert_retention: chrono::Duration,
    /// Behavior events older than this are purged by cleanup.
    pub behavior_retention: chrono::Duration,
    /// Buffer capacity of the engine event broadcast channel.
    pub event_bus_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(30),
            snapshot_capacity: 100,
            behavior_capacity: 10_000,
            snapshot_retention: chrono::Duration::hours(24),
            resolved_alert_retention: chrono::Duration::days(7),
            behavior_retention: chrono::Duration::days(30),
            event_bus_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default  |
    /// |--------------------------------|----------|
    /// | `SAMPLE_INTERVAL_MS`           | `30000`  |
    /// | `SNAPSHOT_CAPACITY`            | `100`    |
    /// | `BEHAVIOR_CAPACITY`            | `10000`  |
    /// | `SNAPSHOT_RETENTION_HOURS`     | `24`     |
    /// | `RESOLVED_ALERT_RETENTION_DAYS`| `7`      |
    /// | `BEHAVIOR_RETENTION_DAYS`      | `30`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            sample_interval: env_parse("SAMPLE_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.sample_interval),
            snapshot_capacity: env_parse("SNAPSHOT_CAPACITY")
                .unwrap_or(defaults.snapshot_capacity),
            behavior_capacity: env_parse("BEHAVIOR_CAPACITY")
                .unwrap_or(defaults.behavior_capacity),
            snapshot_retention: env_parse("SNAPSHOT_RETENTION_HOURS")
                .map(chrono::Duration::hours)
                .unwrap_or(defaults.snapshot_retention),
            resolved_alert_retention: env_parse("RESOLVED_ALERT_RETENTION_DAYS")
                .map(chrono::Duration::days)
                .unwrap_or(defaults.resolved_alert_retention),
            behavior_retention: env_parse("BEHAVIOR_RETENTION_DAYS")
                .map(chrono::Duration::days)
                .unwrap_or(defaults.behavior_retention),
            event_bus_capacity: defaults.event_bus_capacity,
        }
    }
}

/// Read and parse an environment variable; `None` if unset or malformed.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
