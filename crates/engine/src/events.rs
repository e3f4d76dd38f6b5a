//! Typed engine event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Consumers that care about engine activity (WebSocket push, audit trails,
//! dashboards) subscribe here instead of hooking into an untyped global
//! event bus; the event kinds are enumerable at compile time.

use tokio::sync::broadcast;
use vitalis_core::types::Timestamp;
use vitalis_core::Alert;

/// Something the engine did.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A sampler tick produced a new snapshot.
    SnapshotCaptured { timestamp: Timestamp },
    /// A rule's condition held and an alert was created.
    AlertFired(Alert),
    /// A previously open alert observed its condition false.
    AlertResolved(Alert),
    /// A behavior event was appended to the log.
    BehaviorRecorded { user_id: String, event: String },
}

/// Fan-out hub for [`EngineEvent`]s.
///
/// Publishing with zero subscribers is a silent no-op; slow subscribers see
/// `RecvError::Lagged` once the buffer wraps.
pub struct EngineEvents {
    sender: broadcast::Sender<EngineEvent>,
}

impl EngineEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: EngineEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let events = EngineEvents::new(16);
        let mut rx = events.subscribe();

        events.publish(EngineEvent::SnapshotCaptured {
            timestamp: chrono::Utc::now(),
        });

        let received = rx.recv().await.expect("should receive the event");
        assert_matches!(received, EngineEvent::SnapshotCaptured { .. });
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let events = EngineEvents::new(16);
        events.publish(EngineEvent::BehaviorRecorded {
            user_id: "u1".into(),
            event: "page_view".into(),
        });
    }
}
