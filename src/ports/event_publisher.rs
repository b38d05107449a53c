//! EventPublisher port - Interface for publishing domain events.
//!
//! Defines how the application publishes events without knowing about
//! the underlying transport mechanism.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must deliver events at-least-once; handlers may
/// receive duplicates and deduplicate on `event_id`.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events.
    ///
    /// Adapters without atomic multi-publish deliver sequentially with
    /// best-effort semantics.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
