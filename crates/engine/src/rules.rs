//! Threshold rule evaluation and the alert lifecycle.
//!
//! The engine owns the single authoritative index of open alerts, keyed by
//! rule id. That index is what structurally guarantees the invariant that a
//! rule never has two unresolved alerts at once: a rule fires only when its
//! id is absent from the index, and resolution removes it.
//!
//! `duration_secs` on a rule is a true continuous-violation debounce: the
//! condition must hold on every evaluation from the first violating sample
//! until the configured duration has elapsed before the alert fires. Any
//! non-violating sample in between resets the clock. Rules with a zero
//! duration fire on the first violating sample.

use std::collections::HashMap;

use uuid::Uuid;
use vitalis_core::alert::{default_rules, Alert, AlertRule, AlertStatus};
use vitalis_core::types::Timestamp;
use vitalis_core::{CoreError, MetricsSnapshot};

/// Alerts fired and resolved by one evaluation pass.
#[derive(Debug, Default)]
pub struct EvaluationOutcome {
    pub fired: Vec<Alert>,
    pub resolved: Vec<Alert>,
}

/// Evaluates configured rules against snapshots and owns alert state.
#[derive(Debug)]
pub struct AlertRuleEngine {
    rules: Vec<AlertRule>,
    /// One entry per rule with an unresolved (active or acknowledged) alert.
    active: HashMap<String, Alert>,
    /// Per-rule start of the current continuous violation, for debouncing.
    breach_since: HashMap<String, Timestamp>,
    /// Resolved alerts retained until age-based cleanup.
    resolved: Vec<Alert>,
}

impl AlertRuleEngine {
    /// Create an engine with the given rules.
    ///
    /// Rejects invalid rules and duplicate rule ids up front; a duplicate id
    /// would silently collapse two rules into one active-alert slot.
    pub fn new(rules: Vec<AlertRule>) -> Result<Self, CoreError> {
        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate rule id: {}",
                    rule.id
                )));
            }
        }
        Ok(Self {
            rules,
            active: HashMap::new(),
            breach_since: HashMap::new(),
            resolved: Vec::new(),
        })
    }

    /// Create an engine with the built-in default rule set.
    pub fn with_default_rules() -> Self {
        Self::new(default_rules()).expect("default rules are valid")
    }

    /// Evaluate every enabled rule against `snapshot`.
    ///
    /// `now` is the evaluation time, normally the snapshot's own timestamp;
    /// it stamps `triggered_at` / `resolved_at` and drives debouncing.
    pub fn evaluate(&mut self, snapshot: &MetricsSnapshot, now: Timestamp) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();

        for rule in self.rules.iter().filter(|r| r.enabled) {
            let value = rule.metric.value_in(snapshot);
            let violated = rule.op.compare(value, rule.threshold);

            if violated {
                // Acknowledged alerts still occupy the slot: no retrigger
                // until the condition has been observed false.
                if self.active.contains_key(&rule.id) {
                    continue;
                }

                let since = *self.breach_since.entry(rule.id.clone()).or_insert(now);
                let elapsed = now.signed_duration_since(since);
                if elapsed < chrono::Duration::seconds(rule.duration_secs as i64) {
                    tracing::debug!(
                        rule_id = %rule.id,
                        elapsed_secs = elapsed.num_seconds(),
                        required_secs = rule.duration_secs,
                        "Rule violated but still within debounce window"
                    );
                    continue;
                }

                let alert = Alert::triggered(rule, value, now);
                tracing::warn!(
                    rule_id = %rule.id,
                    alert_id = %alert.id,
                    metric = %rule.metric,
                    value,
                    threshold = rule.threshold,
                    "Alert triggered"
                );
                self.active.insert(rule.id.clone(), alert.clone());
                outcome.fired.push(alert);
            } else {
                self.breach_since.remove(&rule.id);

                if let Some(mut alert) = self.active.remove(&rule.id) {
                    alert.status = AlertStatus::Resolved;
                    alert.resolved_at = Some(now);
                    tracing::info!(
                        rule_id = %rule.id,
                        alert_id = %alert.id,
                        "Alert resolved"
                    );
                    self.resolved.push(alert.clone());
                    outcome.resolved.push(alert);
                }
            }
        }

        outcome
    }

    /// All currently unresolved alerts (active and acknowledged), in no
    /// particular order.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.active.values().cloned().collect()
    }

    /// The configured rule set.
    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Mark an unresolved alert as acknowledged.
    ///
    /// Returns `false` if no unresolved alert has that id. Acknowledging
    /// does not free the rule's active slot; the rule cannot retrigger
    /// until the condition resolves.
    pub fn acknowledge(&mut self, alert_id: Uuid) -> bool {
        for alert in self.active.values_mut() {
            if alert.id == alert_id {
                alert.status = AlertStatus::Acknowledged;
                tracing::info!(alert_id = %alert_id, rule_id = %alert.rule_id, "Alert acknowledged");
                return true;
            }
        }
        false
    }

    /// Purge resolved alerts whose resolution is older than `cutoff`.
    ///
    /// Unresolved alerts are never purged, regardless of age. Returns how
    /// many were removed.
    pub fn prune_resolved(&mut self, cutoff: Timestamp) -> usize {
        let before = self.resolved.len();
        self.resolved
            .retain(|a| a.resolved_at.is_some_and(|t| t >= cutoff));
        before - self.resolved.len()
    }

    /// Resolved alerts still within retention, oldest first.
    pub fn resolved_alerts(&self) -> &[Alert] {
        &self.resolved
    }
}

impl Default for AlertRuleEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vitalis_core::alert::{ComparisonOp, Severity};
    use vitalis_core::metrics::MetricKey;

    use super::*;

    fn memory_snapshot(percentage: f64, at: Timestamp) -> MetricsSnapshot {
        let mut snap = MetricsSnapshot {
            timestamp: at,
            ..Default::default()
        };
        snap.memory.percentage = percentage;
        // Keep the cache-hit-rate default rule quiet in tests that only
        // exercise the memory rule.
        snap.cache.hit_rate = 100.0;
        snap
    }

    fn memory_rule(duration_secs: u64) -> AlertRule {
        AlertRule {
            id: "high-memory-usage".into(),
            name: "High memory usage".into(),
            metric: MetricKey::MemoryPercentage,
            op: ComparisonOp::Gt,
            threshold: 85.0,
            duration_secs,
            severity: Severity::High,
            enabled: true,
            channels: vec![],
        }
    }

    fn engine_with(rule: AlertRule) -> AlertRuleEngine {
        AlertRuleEngine::new(vec![rule]).unwrap()
    }

    #[test]
    fn fires_once_and_never_duplicates_while_active() {
        let mut engine = engine_with(memory_rule(0));
        let now = chrono::Utc::now();

        let first = engine.evaluate(&memory_snapshot(90.0, now), now);
        assert_eq!(first.fired.len(), 1);
        assert_eq!(engine.active_alerts().len(), 1);

        // Same condition again: the active index blocks a second alert.
        for i in 1..5 {
            let at = now + chrono::Duration::seconds(30 * i);
            let outcome = engine.evaluate(&memory_snapshot(92.0, at), at);
            assert!(outcome.fired.is_empty());
            assert_eq!(engine.active_alerts().len(), 1);
        }
    }

    #[test]
    fn trigger_resolve_pairing_true_true_false_true() {
        let mut engine = engine_with(memory_rule(0));
        let t0 = chrono::Utc::now();
        let step = chrono::Duration::seconds(30);

        let o1 = engine.evaluate(&memory_snapshot(90.0, t0), t0);
        let o2 = engine.evaluate(&memory_snapshot(91.0, t0 + step), t0 + step);
        let o3 = engine.evaluate(&memory_snapshot(80.0, t0 + step * 2), t0 + step * 2);
        let o4 = engine.evaluate(&memory_snapshot(93.0, t0 + step * 3), t0 + step * 3);

        assert_eq!(o1.fired.len(), 1);
        assert!(o2.fired.is_empty());
        assert_eq!(o3.resolved.len(), 1);
        assert_eq!(o4.fired.len(), 1);

        let first = &o3.resolved[0];
        let second = &o4.fired[0];
        assert_ne!(first.id, second.id);
        assert_eq!(first.status, AlertStatus::Resolved);
        // The first alert resolved after its own trigger and before the
        // second alert's trigger.
        let resolved_at = first.resolved_at.unwrap();
        assert!(first.triggered_at < resolved_at);
        assert!(resolved_at < second.triggered_at);
    }

    #[test]
    fn debounce_requires_continuous_violation() {
        let mut engine = engine_with(memory_rule(60));
        let t0 = chrono::Utc::now();
        let step = chrono::Duration::seconds(30);

        // t=0 and t=30: violating, but the 60s window has not elapsed.
        assert!(engine.evaluate(&memory_snapshot(90.0, t0), t0).fired.is_empty());
        assert!(engine
            .evaluate(&memory_snapshot(90.0, t0 + step), t0 + step)
            .fired
            .is_empty());

        // t=60: window elapsed, fires.
        let outcome = engine.evaluate(&memory_snapshot(90.0, t0 + step * 2), t0 + step * 2);
        assert_eq!(outcome.fired.len(), 1);
    }

    #[test]
    fn debounce_resets_on_a_good_sample() {
        let mut engine = engine_with(memory_rule(60));
        let t0 = chrono::Utc::now();
        let step = chrono::Duration::seconds(30);

        assert!(engine.evaluate(&memory_snapshot(90.0, t0), t0).fired.is_empty());
        // Recovery resets the breach clock.
        assert!(engine
            .evaluate(&memory_snapshot(50.0, t0 + step), t0 + step)
            .fired
            .is_empty());
        // Violating again: a fresh 60s window starts here.
        assert!(engine
            .evaluate(&memory_snapshot(90.0, t0 + step * 2), t0 + step * 2)
            .fired
            .is_empty());
        assert!(engine
            .evaluate(&memory_snapshot(90.0, t0 + step * 3), t0 + step * 3)
            .fired
            .is_empty());
        let outcome = engine.evaluate(&memory_snapshot(90.0, t0 + step * 4), t0 + step * 4);
        assert_eq!(outcome.fired.len(), 1);
    }

    #[test]
    fn acknowledged_alert_still_blocks_retrigger() {
        let mut engine = engine_with(memory_rule(0));
        let now = chrono::Utc::now();

        let fired = engine.evaluate(&memory_snapshot(90.0, now), now).fired;
        let alert_id = fired[0].id;
        assert!(engine.acknowledge(alert_id));

        let at = now + chrono::Duration::seconds(30);
        let outcome = engine.evaluate(&memory_snapshot(95.0, at), at);
        assert!(outcome.fired.is_empty());

        let open = engine.active_alerts();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].status, AlertStatus::Acknowledged);

        // Resolution still works from the acknowledged state.
        let at = now + chrono::Duration::seconds(60);
        let outcome = engine.evaluate(&memory_snapshot(50.0, at), at);
        assert_eq!(outcome.resolved.len(), 1);
        assert!(engine.active_alerts().is_empty());
    }

    #[test]
    fn acknowledge_unknown_id_is_a_no_op() {
        let mut engine = engine_with(memory_rule(0));
        assert!(!engine.acknowledge(Uuid::new_v4()));
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut rule = memory_rule(0);
        rule.enabled = false;
        let mut engine = engine_with(rule);
        let now = chrono::Utc::now();

        let outcome = engine.evaluate(&memory_snapshot(99.0, now), now);
        assert!(outcome.fired.is_empty());
    }

    #[test]
    fn duplicate_rule_ids_are_rejected() {
        let result = AlertRuleEngine::new(vec![memory_rule(0), memory_rule(0)]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn prune_resolved_spares_recent_and_open_alerts() {
        let mut engine = engine_with(memory_rule(0));
        let old = chrono::Utc::now() - chrono::Duration::days(10);

        // Fire and resolve one alert 10 days in the past.
        engine.evaluate(&memory_snapshot(90.0, old), old);
        engine.evaluate(&memory_snapshot(50.0, old + chrono::Duration::seconds(30)),
            old + chrono::Duration::seconds(30));

        // Fire a fresh alert that stays open.
        let now = chrono::Utc::now();
        engine.evaluate(&memory_snapshot(90.0, now), now);

        let removed = engine.prune_resolved(now - chrono::Duration::days(7));
        assert_eq!(removed, 1);
        assert!(engine.resolved_alerts().is_empty());
        // The open alert is untouched.
        assert_eq!(engine.active_alerts().len(), 1);
    }

    #[test]
    fn default_rule_set_evaluates_cleanly() {
        let mut engine = AlertRuleEngine::with_default_rules();
        let now = chrono::Utc::now();

        // A healthy snapshot: nothing fires except the cache rule would on
        // a zero hit rate, so report a healthy cache too.
        let mut snap = MetricsSnapshot {
            timestamp: now,
            ..Default::default()
        };
        snap.cache.hit_rate = 95.0;

        let outcome = engine.evaluate(&snap, now);
        assert!(outcome.fired.is_empty());
        assert!(outcome.resolved.is_empty());
    }
}
