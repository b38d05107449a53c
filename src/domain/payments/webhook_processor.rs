//! Webhook processor - Orchestrates idempotent webhook event handling.
//!
//! The processor coordinates between the provider's webhook deliveries
//! and domain event handlers, ensuring each event is processed at most
//! once even when the provider retries or deliveries race.
//!
//! ## Design
//!
//! 1. Check if the event was already processed (idempotency)
//! 2. Dispatch to the handler for the event type
//! 3. Record the processing result (success, ignored, or failed)
//!
//! ## Race Condition Handling
//!
//! When two deliveries of the same event run concurrently, the first
//! record insert wins (PRIMARY KEY on event id); the loser observes
//! `AlreadyExists` and reports `AlreadyProcessed`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payments::{StripeEvent, StripeEventType, WebhookError};
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

/// Handler for a specific type of Stripe webhook event.
///
/// Implementations should be stateless and focus on a single event type.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Returns the event type this handler processes.
    fn handles(&self) -> StripeEventType;

    /// Handles the webhook event.
    ///
    /// Returns `Ok(())` on success.
    /// Returns `Err(WebhookError::Ignored(_))` if the event should be
    /// acknowledged but not processed (e.g., no matching order).
    /// Returns other `Err` variants for actual failures.
    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError>;
}

/// Dispatches webhook events to the appropriate handler.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Find a handler for the given event type.
    ///
    /// Returns `None` if no handler is registered for this event type.
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler>;

    /// Dispatch an event to its handler.
    ///
    /// Returns `Err(WebhookError::Ignored)` if no handler is registered.
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let event_type = event.parsed_type();
        match self.get_handler(&event_type) {
            Some(handler) => handler.handle(event).await,
            None => Err(WebhookError::Ignored(format!(
                "No handler for event type: {}",
                event.event_type
            ))),
        }
    }
}

/// Processes webhook events with idempotency guarantees.
///
/// This is the main entry point for webhook processing. It coordinates
/// between the idempotency store and event handlers.
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl IdempotentWebhookProcessor {
    /// Creates a new processor with the given repository and dispatcher.
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Process a webhook event at most once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - Event was processed (or ignored)
    /// - `Ok(WebhookResult::AlreadyProcessed)` - Duplicate delivery, skipped
    /// - `Err(_)` - Processing failed
    pub async fn process(&self, event: StripeEvent) -> Result<WebhookResult, WebhookError> {
        if self.repository.find_by_event_id(&event.id).await?.is_some() {
            tracing::debug!(event_id = %event.id, "Duplicate webhook delivery skipped");
            return Ok(WebhookResult::AlreadyProcessed);
        }

        let result = self.dispatcher.dispatch(&event).await;

        let payload = serde_json::to_value(&event)
            .map_err(|e| WebhookError::ParseError(format!("Failed to serialize event: {}", e)))?;

        let record = match &result {
            Ok(()) => WebhookEventRecord::success(&event.id, &event.event_type, payload),
            Err(WebhookError::Ignored(reason)) => {
                WebhookEventRecord::ignored(&event.id, &event.event_type, reason, payload)
            }
            Err(e) => WebhookEventRecord::failed(&event.id, &event.event_type, e.to_string(), payload),
        };

        match self.repository.save(record).await? {
            SaveResult::Inserted => match result {
                Ok(()) => Ok(WebhookResult::Processed),
                // Ignored events are still "processed" from the
                // idempotency perspective
                Err(WebhookError::Ignored(reason)) => {
                    tracing::info!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        reason = %reason,
                        "Webhook event ignored"
                    );
                    Ok(WebhookResult::Processed)
                }
                Err(e) => Err(e),
            },
            SaveResult::AlreadyExists => {
                // Lost the race, another delivery already recorded it
                Ok(WebhookResult::AlreadyProcessed)
            }
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
