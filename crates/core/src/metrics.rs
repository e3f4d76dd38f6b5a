//! Metric snapshot types and the typed metric accessor.
//!
//! A [`MetricsSnapshot`] is one immutable bundle of system, dependency, and
//! API figures captured by a single sampler tick. Alert rules reference
//! individual values through [`MetricKey`], an enum accessor — a renamed
//! field breaks the build instead of silently evaluating to a default that
//! could mask an outage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Snapshot sub-structs
// ---------------------------------------------------------------------------

/// Process-level CPU figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    /// Global CPU utilization percentage (0-100).
    pub usage_percent: f64,
    /// 1, 5, and 15 minute load averages.
    pub load_average: [f64; 3],
}

/// Process / host memory figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub total_bytes: u64,
    /// Used / total as a percentage (0-100); 0 when total is unknown.
    pub percentage: f64,
}

/// Figures reported by the injected database stats provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetrics {
    pub active_connections: u32,
    pub query_count: u64,
    pub avg_query_time_ms: f64,
}

/// Figures reported by the injected cache stats provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Hit rate percentage (0-100).
    pub hit_rate: f64,
    pub key_count: u64,
    /// Human-readable memory usage as reported by the cache (e.g. "1.2M").
    pub memory_usage: String,
}

/// Request counters accumulated since process start or the last reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub request_count: u64,
    pub avg_response_time_ms: f64,
    /// Errors / requests as a percentage (0-100).
    pub error_rate: f64,
}

// ---------------------------------------------------------------------------
// MetricsSnapshot
// ---------------------------------------------------------------------------

/// One timestamped observation of the whole system.
///
/// Created once per sampler tick and never mutated afterwards. Evicted from
/// the time-series store on capacity overflow or by age-based cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default = "default_timestamp")]
    pub timestamp: Timestamp,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub database: DatabaseMetrics,
    pub cache: CacheMetrics,
    pub api: ApiMetrics,
}

fn default_timestamp() -> Timestamp {
    chrono::Utc::now()
}

// ---------------------------------------------------------------------------
// MetricKey
// ---------------------------------------------------------------------------

/// Typed accessor for the scalar metrics an alert rule may watch.
///
/// The serde / display names keep the dotted wire form (`"memory.percentage"`)
/// so rule configuration stays readable, but lookup is total: every variant
/// maps to a real snapshot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "cpu.usage")]
    CpuUsage,
    #[serde(rename = "memory.percentage")]
    MemoryPercentage,
    #[serde(rename = "database.active_connections")]
    DbActiveConnections,
    #[serde(rename = "database.avg_query_time")]
    DbAvgQueryTime,
    #[serde(rename = "cache.hit_rate")]
    CacheHitRate,
    #[serde(rename = "api.request_count")]
    ApiRequestCount,
    #[serde(rename = "api.avg_response_time")]
    ApiAvgResponseTime,
    #[serde(rename = "api.error_rate")]
    ApiErrorRate,
}

impl MetricKey {
    /// Dotted wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::CpuUsage => "cpu.usage",
            MetricKey::MemoryPercentage => "memory.percentage",
            MetricKey::DbActiveConnections => "database.active_connections",
            MetricKey::DbAvgQueryTime => "database.avg_query_time",
            MetricKey::CacheHitRate => "cache.hit_rate",
            MetricKey::ApiRequestCount => "api.request_count",
            MetricKey::ApiAvgResponseTime => "api.avg_response_time",
            MetricKey::ApiErrorRate => "api.error_rate",
        }
    }

    /// Read this metric's value out of a snapshot.
    pub fn value_in(&self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            MetricKey::CpuUsage => snapshot.cpu.usage_percent,
            MetricKey::MemoryPercentage => snapshot.memory.percentage,
            MetricKey::DbActiveConnections => f64::from(snapshot.database.active_connections),
            MetricKey::DbAvgQueryTime => snapshot.database.avg_query_time_ms,
            MetricKey::CacheHitRate => snapshot.cache.hit_rate,
            MetricKey::ApiRequestCount => snapshot.api.request_count as f64,
            MetricKey::ApiAvgResponseTime => snapshot.api.avg_response_time_ms,
            MetricKey::ApiErrorRate => snapshot.api.error_rate,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = CoreError;

    /// Parse a dotted metric name. Unknown names are a configuration error
    /// surfaced at rule-load time, never a silent default at evaluation time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu.usage" => Ok(MetricKey::CpuUsage),
            "memory.percentage" => Ok(MetricKey::MemoryPercentage),
            "database.active_connections" => Ok(MetricKey::DbActiveConnections),
            "database.avg_query_time" => Ok(MetricKey::DbAvgQueryTime),
            "cache.hit_rate" => Ok(MetricKey::CacheHitRate),
            "api.request_count" => Ok(MetricKey::ApiRequestCount),
            "api.avg_response_time" => Ok(MetricKey::ApiAvgResponseTime),
            "api.error_rate" => Ok(MetricKey::ApiErrorRate),
            other => Err(CoreError::UnknownMetric(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
