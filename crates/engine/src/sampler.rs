//! Metric sampling: one immutable snapshot per tick.
//!
//! The sampler reads process/host figures via `sysinfo`, queries the
//! injected dependency and cache providers, and folds in the request
//! counters accumulated since process start (or the last reset).
//!
//! Failure policy: a failing data source zeroes its own sub-struct and logs
//! a warning; a single failing dependency never aborts the snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sysinfo::{CpuExt, System, SystemExt};
use vitalis_core::metrics::{
    ApiMetrics, CacheMetrics, CpuMetrics, DatabaseMetrics, MemoryMetrics, MetricsSnapshot,
};

use crate::providers::{CacheStatsProvider, DependencyStatsProvider};

// ---------------------------------------------------------------------------
// RequestCounters
// ---------------------------------------------------------------------------

/// Cumulative request counters, updated lock-free from request handlers.
#[derive(Debug, Default)]
struct RequestCounters {
    requests: AtomicU64,
    total_response_ms: AtomicU64,
    errors: AtomicU64,
}

impl RequestCounters {
    fn track(&self, response_time_ms: u64, is_error: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_ms
            .fetch_add(response_time_ms, Ordering::Relaxed);
        if is_error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.total_response_ms.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }

    /// Derive average response time and error rate from the raw counters.
    fn derive(&self) -> ApiMetrics {
        let requests = self.requests.load(Ordering::Relaxed);
        let total_ms = self.total_response_ms.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);

        let (avg_response_time_ms, error_rate) = if requests > 0 {
            (
                total_ms as f64 / requests as f64,
                errors as f64 / requests as f64 * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        ApiMetrics {
            request_count: requests,
            avg_response_time_ms,
            error_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// MetricSampler
// ---------------------------------------------------------------------------

/// Builds one [`MetricsSnapshot`] per tick.
pub struct MetricSampler {
    dependency: Arc<dyn DependencyStatsProvider>,
    cache: Arc<dyn CacheStatsProvider>,
    /// Kept across ticks so CPU usage is a delta between refreshes rather
    /// than a meaningless first reading.
    system: Mutex<System>,
    counters: RequestCounters,
}

impl MetricSampler {
    pub fn new(
        dependency: Arc<dyn DependencyStatsProvider>,
        cache: Arc<dyn CacheStatsProvider>,
    ) -> Self {
        Self {
            dependency,
            cache,
            system: Mutex::new(System::new()),
            counters: RequestCounters::default(),
        }
    }

    /// Record one completed request.
    ///
    /// Lock-free; safe to call from any number of concurrent
    /// request-handling contexts.
    pub fn track_request(&self, response_time_ms: u64, is_error: bool) {
        self.counters.track(response_time_ms, is_error);
    }

    /// Zero the cumulative request counters.
    pub fn reset_metrics(&self) {
        self.counters.reset();
    }

    /// Capture one snapshot of system, dependency, and request metrics.
    pub async fn sample(&self) -> MetricsSnapshot {
        let (cpu, memory) = self.read_system();
        let database = self.read_database().await;
        let cache = self.read_cache().await;
        let api = self.counters.derive();

        MetricsSnapshot {
            timestamp: chrono::Utc::now(),
            cpu,
            memory,
            database,
            cache,
            api,
        }
    }

    /// Host CPU and memory figures via `sysinfo`.
    fn read_system(&self) -> (CpuMetrics, MemoryMetrics) {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_cpu();
        system.refresh_memory();

        let load = system.load_average();
        let cpu = CpuMetrics {
            usage_percent: f64::from(system.global_cpu_info().cpu_usage()),
            load_average: [load.one, load.five, load.fifteen],
        };

        let total = system.total_memory();
        let used = system.used_memory();
        let memory = MemoryMetrics {
            used_bytes: used,
            free_bytes: system.free_memory(),
            total_bytes: total,
            percentage: if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        };

        (cpu, memory)
    }

    /// Database figures from the injected provider; zeroed on failure.
    async fn read_database(&self) -> DatabaseMetrics {
        let active_connections = match self.dependency.active_connections().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Database connection count unavailable, reporting 0");
                0
            }
        };

        let (query_count, avg_query_time_ms) = match self.dependency.query_stats().await {
            Ok(stats) => (stats.count, stats.avg_latency_ms),
            Err(e) => {
                tracing::warn!(error = %e, "Database query stats unavailable, reporting 0");
                (0, 0.0)
            }
        };

        DatabaseMetrics {
            active_connections,
            query_count,
            avg_query_time_ms,
        }
    }

    /// Cache figures from the injected provider; zeroed on failure.
    async fn read_cache(&self) -> CacheMetrics {
        match self.cache.stats().await {
            Ok(stats) => CacheMetrics {
                hit_rate: stats.hit_rate,
                key_count: stats.key_count,
                memory_usage: stats.memory_usage,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Cache stats unavailable, reporting empty cache");
                CacheMetrics::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
