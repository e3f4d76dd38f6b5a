//! User behavior events and windowed analytics results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One recorded user/session interaction (page view or custom event).
///
/// Appended once per interaction by request-handling code; immutable
/// afterwards. Evicted on buffer overflow (oldest first) or by age-based
/// cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub user_id: String,
    pub session_id: String,
    /// Event type, e.g. `"page_view"` or `"button_click"`.
    pub event: String,
    pub page: String,
    pub timestamp: Timestamp,
    /// Free-form event-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl BehaviorEvent {
    /// Create an event with only the required fields.
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        event: impl Into<String>,
        page: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            event: event.into(),
            page: page.into(),
            timestamp,
            metadata: None,
            user_agent: None,
            ip: None,
        }
    }

    /// Attach free-form metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach the client user agent and IP.
    pub fn with_client(mut self, user_agent: impl Into<String>, ip: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self.ip = Some(ip.into());
        self
    }
}

/// Inclusive time window for an analytics query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticsWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl AnalyticsWindow {
    /// Whether `ts` falls inside the window (both bounds inclusive).
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Aggregated behavior figures for one [`AnalyticsWindow`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_events: u64,
    /// Count of distinct `user_id` values in the window.
    pub unique_users: u64,
    /// Top pages by event count, descending, ties in first-seen order.
    pub top_pages: Vec<(String, u64)>,
    /// Top event types by count, descending, ties in first-seen order.
    pub top_events: Vec<(String, u64)>,
    /// Event count per hour of day (0-23); only hours with at least one
    /// event are present.
    pub hourly_distribution: BTreeMap<u32, u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
