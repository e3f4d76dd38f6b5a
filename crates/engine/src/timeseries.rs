//! Bounded time-series of metric snapshots.

use vitalis_core::types::Timestamp;
use vitalis_core::MetricsSnapshot;

use crate::ring::RingBuffer;

/// Most-recent-N store of [`MetricsSnapshot`]s.
///
/// The only mutators are the sampler tick (`push`) and cleanup
/// (`prune_older_than`); readers receive copies, never references into the
/// live buffer.
#[derive(Debug)]
pub struct TimeSeriesStore {
    buffer: RingBuffer<MetricsSnapshot>,
}

impl TimeSeriesStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::new(capacity),
        }
    }

    /// Append a snapshot, evicting the oldest once capacity is exceeded.
    pub fn push(&mut self, snapshot: MetricsSnapshot) {
        self.buffer.push(snapshot);
    }

    /// The last `min(n, len)` snapshots in insertion order.
    pub fn recent(&self, n: usize) -> Vec<MetricsSnapshot> {
        self.buffer.recent(n)
    }

    /// Timestamp of the newest snapshot, if any.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.buffer.back().map(|s| s.timestamp)
    }

    /// Drop snapshots captured strictly before `cutoff`; returns how many
    /// were removed.
    pub fn prune_older_than(&mut self, cutoff: Timestamp) -> usize {
        let before = self.buffer.len();
        self.buffer.retain(|s| s.timestamp >= cutoff);
        before - self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_at(ts: Timestamp) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: ts,
            ..Default::default()
        }
    }

    #[test]
    fn bounded_at_capacity() {
        let mut store = TimeSeriesStore::new(100);
        let now = chrono::Utc::now();
        for i in 0..250 {
            store.push(snapshot_at(now + chrono::Duration::seconds(i)));
            assert!(store.len() <= 100);
        }
        assert_eq!(store.len(), 100);

        // The survivors are the newest 100, in insertion order.
        let recent = store.recent(100);
        assert_eq!(recent.len(), 100);
        assert_eq!(recent[0].timestamp, now + chrono::Duration::seconds(150));
        assert_eq!(recent[99].timestamp, now + chrono::Duration::seconds(249));
    }

    #[test]
    fn last_timestamp_tracks_newest_push() {
        let mut store = TimeSeriesStore::new(10);
        assert!(store.last_timestamp().is_none());

        let now = chrono::Utc::now();
        store.push(snapshot_at(now));
        let later = now + chrono::Duration::seconds(30);
        store.push(snapshot_at(later));

        assert_eq!(store.last_timestamp(), Some(later));
    }

    #[test]
    fn prune_removes_only_stale_snapshots() {
        let mut store = TimeSeriesStore::new(10);
        let now = chrono::Utc::now();
        store.push(snapshot_at(now - chrono::Duration::hours(30)));
        store.push(snapshot_at(now - chrono::Duration::hours(2)));
        store.push(snapshot_at(now));

        let removed = store.prune_older_than(now - chrono::Duration::hours(24));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
    }
}
