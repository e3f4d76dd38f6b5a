//! Bounded behavior event log and windowed analytics.
//!
//! `record` is called from many concurrent request-handling contexts, so the
//! buffer lives behind an `RwLock`; `analyze` copies the in-window events
//! out under the read lock and aggregates on the copy, never on the live
//! structure.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use chrono::Timelike;
use indexmap::IndexMap;
use vitalis_core::behavior::{AnalyticsReport, AnalyticsWindow, BehaviorEvent};
use vitalis_core::types::Timestamp;

use crate::ring::RingBuffer;

/// Number of entries reported in the top-pages and top-events lists.
const TOP_N: usize = 10;

/// Append-only (plus eviction) log of user interaction events.
pub struct BehaviorLog {
    buffer: RwLock<RingBuffer<BehaviorEvent>>,
}

impl BehaviorLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RwLock::new(RingBuffer::new(capacity)),
        }
    }

    /// Append one event, evicting the oldest on overflow.
    pub fn record(&self, event: BehaviorEvent) {
        let mut buffer = self.buffer.write().unwrap_or_else(|e| e.into_inner());
        buffer.push(event);
    }

    /// Aggregate events whose timestamps fall inside `window` (inclusive).
    pub fn analyze(&self, window: AnalyticsWindow) -> AnalyticsReport {
        let in_window: Vec<BehaviorEvent> = {
            let buffer = self.buffer.read().unwrap_or_else(|e| e.into_inner());
            buffer
                .iter()
                .filter(|e| window.contains(e.timestamp))
                .cloned()
                .collect()
        };

        let mut users: HashSet<&str> = HashSet::new();
        // IndexMap keeps first-seen order, which is the documented
        // tie-breaking rule for the top-N lists.
        let mut pages: IndexMap<&str, u64> = IndexMap::new();
        let mut events: IndexMap<&str, u64> = IndexMap::new();
        let mut hourly: BTreeMap<u32, u64> = BTreeMap::new();

        for event in &in_window {
            users.insert(event.user_id.as_str());
            *pages.entry(event.page.as_str()).or_insert(0) += 1;
            *events.entry(event.event.as_str()).or_insert(0) += 1;
            *hourly.entry(event.timestamp.hour()).or_insert(0) += 1;
        }

        AnalyticsReport {
            total_events: in_window.len() as u64,
            unique_users: users.len() as u64,
            top_pages: top_n(pages),
            top_events: top_n(events),
            hourly_distribution: hourly,
        }
    }

    /// Drop events older than `cutoff`; returns how many were removed.
    pub fn prune_older_than(&self, cutoff: Timestamp) -> usize {
        let mut buffer = self.buffer.write().unwrap_or_else(|e| e.into_inner());
        let before = buffer.len();
        buffer.retain(|e| e.timestamp >= cutoff);
        before - buffer.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Top `TOP_N` entries by count, descending; ties keep first-seen order.
fn top_n(counts: IndexMap<&str, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    // Stable sort preserves the map's insertion order among equal counts.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(TOP_N);
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event_at(user: &str, page: &str, kind: &str, hour: u32, minute: u32) -> BehaviorEvent {
        let ts = chrono::Utc
            .with_ymd_and_hms(2026, 8, 20, hour, minute, 0)
            .unwrap();
        BehaviorEvent::new(user, format!("session-{user}"), kind, page, ts)
    }

    fn full_day_window() -> AnalyticsWindow {
        AnalyticsWindow {
            start: chrono::Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap(),
            end: chrono::Utc.with_ymd_and_hms(2026, 8, 20, 23, 59, 59).unwrap(),
        }
    }

    #[test]
    fn unique_users_and_hourly_histogram() {
        let log = BehaviorLog::new(100);
        log.record(event_at("A", "/home", "page_view", 10, 0));
        log.record(event_at("B", "/home", "page_view", 10, 30));
        log.record(event_at("A", "/records", "page_view", 23, 0));

        let report = log.analyze(full_day_window());

        assert_eq!(report.total_events, 3);
        assert_eq!(report.unique_users, 2);
        assert_eq!(report.hourly_distribution.len(), 2);
        assert_eq!(report.hourly_distribution[&10], 2);
        assert_eq!(report.hourly_distribution[&23], 1);
    }

    #[test]
    fn events_outside_the_window_are_ignored() {
        let log = BehaviorLog::new(100);
        log.record(event_at("A", "/home", "page_view", 10, 0));

        let narrow = AnalyticsWindow {
            start: chrono::Utc.with_ymd_and_hms(2026, 8, 20, 11, 0, 0).unwrap(),
            end: chrono::Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap(),
        };
        let report = log.analyze(narrow);
        assert_eq!(report.total_events, 0);
        assert!(report.hourly_distribution.is_empty());
    }

    #[test]
    fn top_pages_descending_with_first_seen_ties() {
        let log = BehaviorLog::new(100);
        // /billing twice; /home and /records once each, /home seen first.
        log.record(event_at("A", "/home", "page_view", 9, 0));
        log.record(event_at("A", "/records", "page_view", 9, 1));
        log.record(event_at("B", "/billing", "page_view", 9, 2));
        log.record(event_at("B", "/billing", "page_view", 9, 3));

        let report = log.analyze(full_day_window());
        assert_eq!(report.top_pages[0], ("/billing".to_string(), 2));
        assert_eq!(report.top_pages[1], ("/home".to_string(), 1));
        assert_eq!(report.top_pages[2], ("/records".to_string(), 1));
    }

    #[test]
    fn top_lists_are_capped_at_ten() {
        let log = BehaviorLog::new(100);
        for i in 0..15 {
            log.record(event_at("A", &format!("/page-{i}"), "page_view", 9, 0));
        }
        let report = log.analyze(full_day_window());
        assert_eq!(report.top_pages.len(), 10);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let log = BehaviorLog::new(3);
        for i in 0..5 {
            log.record(event_at(&format!("user-{i}"), "/home", "page_view", 9, i));
        }
        assert_eq!(log.len(), 3);

        let report = log.analyze(full_day_window());
        // Only the last three users remain.
        assert_eq!(report.unique_users, 3);
    }

    #[test]
    fn prune_removes_only_stale_events() {
        let log = BehaviorLog::new(100);
        let now = chrono::Utc::now();

        let mut old = BehaviorEvent::new("A", "s", "page_view", "/home", now);
        old.timestamp = now - chrono::Duration::days(40);
        log.record(old);
        log.record(BehaviorEvent::new("B", "s", "page_view", "/home", now));

        let removed = log.prune_older_than(now - chrono::Duration::days(30));
        assert_eq!(removed, 1);
        assert_eq!(log.len(), 1);
    }
}
