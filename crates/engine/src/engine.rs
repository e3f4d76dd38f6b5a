//! The observability engine facade.
//!
//! One [`ObservabilityEngine`] is constructed at service bootstrap and
//! shared via `Arc` with HTTP handlers and schedulers. A single spawned
//! loop drives sampler ticks; tick bodies run to completion (sample →
//! evaluate → dispatch) before the next tick is considered, so a slow
//! dependency call can never interleave two evaluations. Missed ticks are
//! skipped, not queued.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vitalis_core::behavior::{AnalyticsReport, AnalyticsWindow, BehaviorEvent};
use vitalis_core::{Alert, AlertRule, CoreError, MetricsSnapshot, StatusReport};
use vitalis_notify::NotificationDispatcher;

use crate::behavior::BehaviorLog;
use crate::config::EngineConfig;
use crate::events::{EngineEvent, EngineEvents};
use crate::providers::{CacheStatsProvider, DependencyStatsProvider};
use crate::rules::AlertRuleEngine;
use crate::sampler::MetricSampler;
use crate::status::build_report;
use crate::timeseries::TimeSeriesStore;

/// The platform observability and alerting engine.
pub struct ObservabilityEngine {
    config: EngineConfig,
    sampler: MetricSampler,
    store: RwLock<TimeSeriesStore>,
    rules: Mutex<AlertRuleEngine>,
    behavior: BehaviorLog,
    dispatcher: Arc<NotificationDispatcher>,
    events: EngineEvents,
    started_at: Instant,
    /// `Some` while the tick loop is running.
    run_token: Mutex<Option<CancellationToken>>,
}

impl ObservabilityEngine {
    /// Build an engine with the default rule set.
    pub fn new(
        config: EngineConfig,
        dependency: Arc<dyn DependencyStatsProvider>,
        cache: Arc<dyn CacheStatsProvider>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self::assemble(config, dependency, cache, dispatcher, AlertRuleEngine::with_default_rules())
    }

    /// Build an engine with an explicit rule set.
    pub fn with_rules(
        config: EngineConfig,
        dependency: Arc<dyn DependencyStatsProvider>,
        cache: Arc<dyn CacheStatsProvider>,
        dispatcher: NotificationDispatcher,
        rules: Vec<AlertRule>,
    ) -> Result<Self, CoreError> {
        Ok(Self::assemble(
            config,
            dependency,
            cache,
            dispatcher,
            AlertRuleEngine::new(rules)?,
        ))
    }

    fn assemble(
        config: EngineConfig,
        dependency: Arc<dyn DependencyStatsProvider>,
        cache: Arc<dyn CacheStatsProvider>,
        dispatcher: NotificationDispatcher,
        rules: AlertRuleEngine,
    ) -> Self {
        Self {
            sampler: MetricSampler::new(dependency, cache),
            store: RwLock::new(TimeSeriesStore::new(config.snapshot_capacity)),
            rules: Mutex::new(rules),
            behavior: BehaviorLog::new(config.behavior_capacity),
            dispatcher: Arc::new(dispatcher),
            events: EngineEvents::new(config.event_bus_capacity),
            started_at: Instant::now(),
            run_token: Mutex::new(None),
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the sampling loop with the given tick interval.
    ///
    /// Idempotent: calling while already running is a logged no-op. The
    /// loop runs until [`stop`](Self::stop) is called.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let mut guard = self.run_token.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            tracing::info!("Observability engine already running, start ignored");
            return;
        }

        let token = CancellationToken::new();
        *guard = Some(token.clone());
        drop(guard);

        tracing::info!(interval_ms = interval.as_millis() as u64, "Observability engine started");

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A tick that overruns its slot is skipped, never queued: the
            // loop body is the only writer of the store and the alert
            // index, and it always runs to completion before the next tick.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Observability engine tick loop stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        engine.tick().await;
                    }
                }
            }
        });
    }

    /// Start with the interval from [`EngineConfig`].
    pub fn start_default(self: &Arc<Self>) {
        let interval = self.config.sample_interval;
        self.start(interval);
    }

    /// Stop scheduling future ticks.
    ///
    /// An in-flight tick is not forcibly cancelled; it finishes its
    /// sample/evaluate/dispatch sequence.
    pub fn stop(&self) {
        let mut guard = self.run_token.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = guard.take() {
            token.cancel();
            tracing::info!("Observability engine stopped");
        }
    }

    /// Whether the sampling loop is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.run_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Run one full sampling cycle immediately: capture a snapshot, push it
    /// through evaluation and dispatch, then run retention cleanup.
    pub async fn tick(&self) {
        let snapshot = self.sampler.sample().await;
        self.process_snapshot(snapshot);
        self.cleanup();
    }

    /// Push a snapshot through the store → evaluation → dispatch path.
    ///
    /// The tick loop calls this with freshly sampled data; backfill tooling
    /// and tests can feed synthetic snapshots.
    pub fn process_snapshot(&self, snapshot: MetricsSnapshot) {
        let timestamp = snapshot.timestamp;

        {
            let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
            store.push(snapshot.clone());
        }
        self.events.publish(EngineEvent::SnapshotCaptured { timestamp });

        // Evaluate under the rules lock, then collect what needs dispatch so
        // no lock is held across delivery.
        let to_dispatch: Vec<(Alert, Vec<String>)> = {
            let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
            let outcome = rules.evaluate(&snapshot, timestamp);

            for alert in &outcome.resolved {
                self.events.publish(EngineEvent::AlertResolved(alert.clone()));
            }

            outcome
                .fired
                .into_iter()
                .map(|alert| {
                    let channels = rules
                        .rules()
                        .iter()
                        .find(|r| r.id == alert.rule_id)
                        .map(|r| r.channels.clone())
                        .unwrap_or_default();
                    (alert, channels)
                })
                .collect()
        };

        // Fire-and-forget: delivery never blocks or fails the evaluation
        // path.
        for (alert, channels) in to_dispatch {
            self.events.publish(EngineEvent::AlertFired(alert.clone()));
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                dispatcher.dispatch(&alert, &channels).await;
            });
        }
    }

    /// Purge entities past their retention windows.
    ///
    /// Snapshots, resolved alerts, and behavior events each have their own
    /// retention; unresolved alerts are never purged regardless of age.
    pub fn cleanup(&self) {
        let now = chrono::Utc::now();

        let snapshots = {
            let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
            store.prune_older_than(now - self.config.snapshot_retention)
        };
        let alerts = {
            let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
            rules.prune_resolved(now - self.config.resolved_alert_retention)
        };
        let events = self
            .behavior
            .prune_older_than(now - self.config.behavior_retention);

        if snapshots + alerts + events > 0 {
            tracing::info!(snapshots, alerts, events, "Retention cleanup purged entities");
        }
    }

    // -----------------------------------------------------------------------
    // Request tracking and behavior recording
    // -----------------------------------------------------------------------

    /// Record one completed request; safe from any number of concurrent
    /// request-handling contexts.
    pub fn track_request(&self, response_time_ms: u64, is_error: bool) {
        self.sampler.track_request(response_time_ms, is_error);
    }

    /// Zero the cumulative request counters.
    pub fn reset_metrics(&self) {
        self.sampler.reset_metrics();
    }

    /// Append one behavior event to the bounded log.
    pub fn record(&self, event: BehaviorEvent) {
        self.events.publish(EngineEvent::BehaviorRecorded {
            user_id: event.user_id.clone(),
            event: event.event.clone(),
        });
        self.behavior.record(event);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The last `min(count, stored)` snapshots in insertion order.
    pub fn recent_metrics(&self, count: usize) -> Vec<MetricsSnapshot> {
        self.store
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .recent(count)
    }

    /// All currently unresolved alerts.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active_alerts()
    }

    /// The configured alert rules.
    pub fn alert_rules(&self) -> Vec<AlertRule> {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .rules()
            .to_vec()
    }

    /// Mark an unresolved alert as acknowledged; `false` if no such alert.
    pub fn acknowledge_alert(&self, alert_id: Uuid) -> bool {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .acknowledge(alert_id)
    }

    /// Windowed behavior analytics.
    pub fn analyze(&self, window: AnalyticsWindow) -> AnalyticsReport {
        self.behavior.analyze(window)
    }

    /// Current coarse health verdict with alert count, last snapshot
    /// timestamp, and uptime.
    pub fn status(&self) -> StatusReport {
        let open = self.active_alerts();
        let last = self
            .store
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .last_timestamp();
        build_report(&open, last, self.started_at)
    }

    /// Subscribe to engine activity events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{NullCacheStats, NullDependencyStats};

    fn test_engine() -> Arc<ObservabilityEngine> {
        Arc::new(ObservabilityEngine::new(
            EngineConfig::default(),
            Arc::new(NullDependencyStats),
            Arc::new(NullCacheStats),
            NotificationDispatcher::new(),
        ))
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_clears_the_loop() {
        let engine = test_engine();
        assert!(!engine.is_running());

        engine.start(Duration::from_secs(60));
        assert!(engine.is_running());

        // Second start is a no-op, not a second loop.
        engine.start(Duration::from_secs(60));
        assert!(engine.is_running());

        engine.stop();
        assert!(!engine.is_running());

        // Stop again is harmless.
        engine.stop();
    }

    #[tokio::test]
    async fn tick_populates_the_time_series() {
        let engine = test_engine();
        assert!(engine.recent_metrics(10).is_empty());

        engine.tick().await;
        let recent = engine.recent_metrics(10);
        assert_eq!(recent.len(), 1);
        assert!(engine.status().last_snapshot_at.is_some());
    }

    #[tokio::test]
    async fn track_request_flows_into_the_next_snapshot() {
        let engine = test_engine();
        for _ in 0..9 {
            engine.track_request(100, false);
        }
        engine.track_request(100, true);

        engine.tick().await;
        let snapshot = engine.recent_metrics(1).remove(0);
        assert_eq!(snapshot.api.request_count, 10);
        assert!((snapshot.api.error_rate - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn record_feeds_analytics_and_the_event_bus() {
        let engine = test_engine();
        let mut rx = engine.subscribe();

        let now = chrono::Utc::now();
        engine.record(BehaviorEvent::new("u1", "s1", "page_view", "/home", now));

        let report = engine.analyze(AnalyticsWindow {
            start: now - chrono::Duration::minutes(1),
            end: now + chrono::Duration::minutes(1),
        });
        assert_eq!(report.total_events, 1);
        assert_eq!(report.unique_users, 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EngineEvent::BehaviorRecorded { .. }));
    }
}
