//! Event infrastructure for domain event publishing.
//!
//! Provides the transport wrapper (`EventEnvelope`) and event identity
//! (`EventId`) used when aggregates report state transitions to the
//! rest of the system.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// Unique identifier for a domain event instance.
///
/// Used by consumers for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random EventId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport wrapper for domain events.
///
/// Carries the event payload together with routing and correlation
/// context so publishers and subscribers stay decoupled from the
/// concrete event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance (deduplication).
    pub event_id: EventId,

    /// Event type string for routing (e.g., "order.paid").
    pub event_type: String,

    /// ID of the aggregate that emitted the event.
    pub aggregate_id: String,

    /// Type of aggregate (e.g., "Order", "Enrollment").
    pub aggregate_type: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Serialized event payload.
    pub payload: JsonValue,
}

impl EventEnvelope {
    /// Creates a new envelope with a fresh event ID stamped at the
    /// current time.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
        }
    }
}
