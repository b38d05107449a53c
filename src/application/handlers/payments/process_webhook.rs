//! ProcessStripeWebhookHandler - HTTP-facing webhook command handler.
//!
//! Verifies the signature, then runs the event through the idempotent
//! processor, which dispatches over the closed event-type set.

use std::sync::Arc;

use crate::domain::payments::{
    IdempotentWebhookProcessor, StripeEventType, StripeWebhookVerifier, WebhookDispatcher,
    WebhookError, WebhookEventHandler,
};
use crate::ports::{WebhookEventRepository, WebhookResult};

use super::event_handlers::{
    ChargeRefundedHandler, CheckoutCompletedHandler, PaymentFailedHandler, PaymentSucceededHandler,
};

/// Command carrying the raw webhook request.
#[derive(Debug, Clone)]
pub struct ProcessStripeWebhookCommand {
    /// Raw request body (signature covers these exact bytes).
    pub payload: Vec<u8>,
    /// Stripe-Signature header value.
    pub signature: String,
}

/// Routes events to the handler for their type.
pub struct CheckoutWebhookDispatcher {
    checkout_completed: CheckoutCompletedHandler,
    payment_succeeded: PaymentSucceededHandler,
    payment_failed: PaymentFailedHandler,
    charge_refunded: ChargeRefundedHandler,
}

impl CheckoutWebhookDispatcher {
    pub fn new(
        checkout_completed: CheckoutCompletedHandler,
        payment_succeeded: PaymentSucceededHandler,
        payment_failed: PaymentFailedHandler,
        charge_refunded: ChargeRefundedHandler,
    ) -> Self {
        Self {
            checkout_completed,
            payment_succeeded,
            payment_failed,
            charge_refunded,
        }
    }
}

impl WebhookDispatcher for CheckoutWebhookDispatcher {
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler> {
        match event_type {
            StripeEventType::CheckoutSessionCompleted => Some(&self.checkout_completed),
            StripeEventType::PaymentIntentSucceeded => Some(&self.payment_succeeded),
            StripeEventType::PaymentIntentFailed => Some(&self.payment_failed),
            StripeEventType::ChargeRefunded => Some(&self.charge_refunded),
            StripeEventType::Unknown => None,
        }
    }
}

/// Handler for inbound Stripe webhooks.
pub struct ProcessStripeWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    processor: IdempotentWebhookProcessor,
    /// Reject test-mode events (enabled in production).
    require_livemode: bool,
}

impl ProcessStripeWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<CheckoutWebhookDispatcher>,
        require_livemode: bool,
    ) -> Self {
        Self {
            verifier,
            processor: IdempotentWebhookProcessor::new(webhook_events, dispatcher),
            require_livemode,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessStripeWebhookCommand,
    ) -> Result<WebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        if self.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::Ignored(format!(
                "test mode event {} not processed",
                event.id
            )));
        }

        let result = self.processor.process(event).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::checkout::test_support::{
        pending_order, InMemoryCourses, InMemoryEnrollments, InMemoryOrders, InMemoryWebhookEvents,
        RecordingPublisher,
    };
    use crate::application::handlers::checkout::OrderSettlement;
    use crate::domain::checkout::OrderStatus;
    use crate::domain::payments::compute_test_signature;
    use serde_json::json;

    const SECRET: &str = "whsec_handler_tests";

    struct Fixture {
        handler: ProcessStripeWebhookHandler,
        orders: Arc<InMemoryOrders>,
        enrollments: Arc<InMemoryEnrollments>,
    }

    fn fixture(orders: Arc<InMemoryOrders>, courses: Arc<InMemoryCourses>) -> Fixture {
        let enrollments = Arc::new(InMemoryEnrollments::new());
        let events = Arc::new(RecordingPublisher::new());
        let settlement = Arc::new(OrderSettlement::new(
            orders.clone(),
            enrollments.clone(),
            courses,
            events.clone(),
        ));
        let dispatcher = Arc::new(CheckoutWebhookDispatcher::new(
            CheckoutCompletedHandler::new(orders.clone(), settlement),
            PaymentSucceededHandler::new(orders.clone(), events.clone()),
            PaymentFailedHandler::new(orders.clone(), events.clone()),
            ChargeRefundedHandler::new(orders.clone(), enrollments.clone(), events),
        ));
        Fixture {
            handler: ProcessStripeWebhookHandler::new(
                Arc::new(StripeWebhookVerifier::new(SECRET)),
                Arc::new(InMemoryWebhookEvents::new()),
                dispatcher,
                false,
            ),
            orders,
            enrollments,
        }
    }

    fn signed_command(event_json: serde_json::Value) -> ProcessStripeWebhookCommand {
        let payload = serde_json::to_string(&event_json).unwrap();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(SECRET, timestamp, &payload);
        ProcessStripeWebhookCommand {
            payload: payload.into_bytes(),
            signature: format!("t={},v1={}", timestamp, signature),
        }
    }

    fn checkout_completed_json(event_id: &str, session_id: &str) -> serde_json::Value {
        json!({
            "id": event_id,
            "type": "checkout.session.completed",
            "created": chrono::Utc::now().timestamp(),
            "data": {"object": {"id": session_id, "payment_intent": "pi_wire", "payment_status": "paid"}},
            "livemode": false,
            "api_version": "2023-10-16"
        })
    }

    #[tokio::test]
    async fn valid_webhook_settles_order_and_enrolls() {
        let (course, courses) = InMemoryCourses::with_course(2000, true);
        let mut order = pending_order(course.id, 2000);
        order.checkout_session_id = "cs_wire".to_string();
        let fx = fixture(Arc::new(InMemoryOrders::with_order(order.clone())), courses);

        let result = fx
            .handler
            .handle(signed_command(checkout_completed_json("evt_wire_1", "cs_wire")))
            .await
            .unwrap();

        assert_eq!(result, WebhookResult::Processed);
        assert_eq!(fx.orders.get(&order.id).unwrap().status, OrderStatus::Paid);
        assert_eq!(fx.enrollments.count(), 1);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_skipped() {
        let (course, courses) = InMemoryCourses::with_course(2000, true);
        let mut order = pending_order(course.id, 2000);
        order.checkout_session_id = "cs_dup".to_string();
        let fx = fixture(Arc::new(InMemoryOrders::with_order(order)), courses);

        let first = fx
            .handler
            .handle(signed_command(checkout_completed_json("evt_dup", "cs_dup")))
            .await
            .unwrap();
        let second = fx
            .handler
            .handle(signed_command(checkout_completed_json("evt_dup", "cs_dup")))
            .await
            .unwrap();

        assert_eq!(first, WebhookResult::Processed);
        assert_eq!(second, WebhookResult::AlreadyProcessed);
        assert_eq!(fx.enrollments.count(), 1);
    }

    #[tokio::test]
    async fn invalid_signature_mutates_nothing() {
        let (course, courses) = InMemoryCourses::with_course(2000, true);
        let mut order = pending_order(course.id, 2000);
        order.checkout_session_id = "cs_sig".to_string();
        let fx = fixture(Arc::new(InMemoryOrders::with_order(order.clone())), courses);

        let payload =
            serde_json::to_string(&checkout_completed_json("evt_sig", "cs_sig")).unwrap();
        let timestamp = chrono::Utc::now().timestamp();
        let cmd = ProcessStripeWebhookCommand {
            payload: payload.into_bytes(),
            signature: format!("t={},v1={}", timestamp, "0".repeat(64)),
        };

        let result = fx.handler.handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert_eq!(
            fx.orders.get(&order.id).unwrap().status,
            OrderStatus::Pending
        );
        assert_eq!(fx.enrollments.count(), 0);
    }

    #[tokio::test]
    async fn test_mode_event_is_rejected_when_livemode_required() {
        let (course, courses) = InMemoryCourses::with_course(2000, true);
        let mut order = pending_order(course.id, 2000);
        order.checkout_session_id = "cs_testmode".to_string();
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let fx = fixture(orders.clone(), courses);
        let strict = ProcessStripeWebhookHandler {
            require_livemode: true,
            ..fx.handler
        };

        let result = strict
            .handle(signed_command(checkout_completed_json(
                "evt_testmode",
                "cs_testmode",
            )))
            .await;

        assert!(matches!(result, Err(WebhookError::Ignored(_))));
        assert_eq!(
            orders.get(&order.id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn unknown_event_type_is_acknowledged() {
        let (_, courses) = InMemoryCourses::with_course(2000, true);
        let fx = fixture(Arc::new(InMemoryOrders::new()), courses);

        let result = fx
            .handler
            .handle(signed_command(json!({
                "id": "evt_unknown",
                "type": "customer.created",
                "created": chrono::Utc::now().timestamp(),
                "data": {"object": {}},
                "livemode": false,
                "api_version": "2023-10-16"
            })))
            .await
            .unwrap();

        assert_eq!(result, WebhookResult::Processed);
    }
}
