//! Dependency stats provider seams.
//!
//! The sampler does not talk to the database pool or the cache directly;
//! the owning service injects implementations of these traits at bootstrap.
//! The `Null*` implementations report empty stats and are used in tests and
//! in deployments without the corresponding dependency.

use async_trait::async_trait;

/// Cumulative query statistics reported by the database layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStats {
    /// Total queries executed since process start.
    pub count: u64,
    /// Mean query latency in milliseconds.
    pub avg_latency_ms: f64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Hit rate percentage (0-100).
    pub hit_rate: f64,
    pub key_count: u64,
    /// Human-readable memory usage as reported by the cache.
    pub memory_usage: String,
}

/// Database-side figures consumed by the sampler.
#[async_trait]
pub trait DependencyStatsProvider: Send + Sync {
    /// Number of currently active database connections.
    async fn active_connections(&self) -> Result<u32, ProviderError>;

    /// Cumulative query count and average latency.
    async fn query_stats(&self) -> Result<QueryStats, ProviderError>;
}

/// Cache-side figures consumed by the sampler.
#[async_trait]
pub trait CacheStatsProvider: Send + Sync {
    async fn stats(&self) -> Result<CacheStats, ProviderError>;
}

/// Error reported by a stats provider.
///
/// The sampler treats any provider error as "this sub-metric is unavailable
/// this tick": it logs a warning and substitutes zeroed figures. A failing
/// dependency never aborts a snapshot.
#[derive(Debug, thiserror::Error)]
#[error("stats provider failed: {0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

// ---------------------------------------------------------------------------
// Null providers
// ---------------------------------------------------------------------------

/// Reports zero connections and no queries.
#[derive(Debug, Default)]
pub struct NullDependencyStats;

#[async_trait]
impl DependencyStatsProvider for NullDependencyStats {
    async fn active_connections(&self) -> Result<u32, ProviderError> {
        Ok(0)
    }

    async fn query_stats(&self) -> Result<QueryStats, ProviderError> {
        Ok(QueryStats::default())
    }
}

/// Reports an empty cache.
#[derive(Debug, Default)]
pub struct NullCacheStats;

#[async_trait]
impl CacheStatsProvider for NullCacheStats {
    async fn stats(&self) -> Result<CacheStats, ProviderError> {
        Ok(CacheStats::default())
    }
}
