//! Vitalis observability and alerting engine.
//!
//! The engine periodically samples system, dependency, and request metrics
//! into immutable snapshots, keeps a bounded time-series of them, evaluates
//! threshold rules into a deduplicated alert lifecycle, fans fired alerts
//! out to notification channels, and answers windowed behavior-analytics
//! queries.
//!
//! Construct one [`ObservabilityEngine`] at service bootstrap and share it
//! via `Arc` with whatever consumes it (HTTP handlers, schedulers). There is
//! deliberately no process-wide singleton.

pub mod behavior;
pub mod config;
pub mod engine;
pub mod events;
pub mod providers;
pub mod ring;
pub mod rules;
pub mod sampler;
pub mod status;
pub mod timeseries;

pub use config::EngineConfig;
pub use engine::ObservabilityEngine;
pub use events::EngineEvent;
pub use providers::{CacheStats, CacheStatsProvider, DependencyStatsProvider, QueryStats};
