//! In-memory event bus.
//!
//! Retains published envelopes and logs each one via `tracing`. Suitable
//! for a single-process deployment; a broker-backed adapter would
//! implement the same port.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Maximum retained envelopes; older entries are dropped first.
const RETAINED_EVENTS: usize = 1024;

/// In-memory implementation of the `EventPublisher` port.
pub struct InMemoryEventBus {
    events: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of retained events, oldest first.
    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            "Domain event published"
        );

        let mut events = self.events.write().await;
        if events.len() >= RETAINED_EVENTS {
            events.remove(0);
        }
        events.push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, "agg-1", "Order", json!({}))
    }

    #[tokio::test]
    async fn publish_retains_events_in_order() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("order.paid")).await.unwrap();
        bus.publish(envelope("enrollment.created")).await.unwrap();

        let events = bus.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "order.paid");
        assert_eq!(events[1].event_type, "enrollment.created");
    }

    #[tokio::test]
    async fn publish_all_retains_every_event() {
        let bus = InMemoryEventBus::new();
        bus.publish_all(vec![envelope("a"), envelope("b"), envelope("c")])
            .await
            .unwrap();
        assert_eq!(bus.events().await.len(), 3);
    }

    #[tokio::test]
    async fn retention_cap_drops_oldest() {
        let bus = InMemoryEventBus::new();
        for i in 0..(RETAINED_EVENTS + 5) {
            bus.publish(envelope(&format!("event.{}", i))).await.unwrap();
        }

        let events = bus.events().await;
        assert_eq!(events.len(), RETAINED_EVENTS);
        assert_eq!(events[0].event_type, "event.5");
    }
}
