//! Per-event-type webhook handlers.
//!
//! Each handler owns one provider event type. Lookup misses are terminal:
//! an event referencing an unknown order or payment intent is logged and
//! acknowledged, never retried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::handlers::checkout::OrderSettlement;
use crate::domain::checkout::{CheckoutError, OrderEvent};
use crate::domain::enrollment::EnrollmentEvent;
use crate::domain::foundation::Timestamp;
use crate::domain::payments::{
    ChargePayload, CheckoutSessionPayload, PaymentIntentPayload, StripeEvent, StripeEventType,
    WebhookError, WebhookEventHandler,
};
use crate::ports::{EnrollmentRepository, EventPublisher, OrderRepository};

impl From<CheckoutError> for WebhookError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidState { current, attempted } => {
                WebhookError::InvalidTransition(format!("cannot {} in {} state", attempted, current))
            }
            other => WebhookError::Database(other.to_string()),
        }
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(format!("invalid event object: {}", e)))
}

// ════════════════════════════════════════════════════════════════════════════════
// checkout.session.completed
// ════════════════════════════════════════════════════════════════════════════════

/// Settles the order named by the session and ensures an enrollment exists.
pub struct CheckoutCompletedHandler {
    orders: Arc<dyn OrderRepository>,
    settlement: Arc<OrderSettlement>,
}

impl CheckoutCompletedHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, settlement: Arc<OrderSettlement>) -> Self {
        Self { orders, settlement }
    }
}

#[async_trait]
impl WebhookEventHandler for CheckoutCompletedHandler {
    fn handles(&self) -> StripeEventType {
        StripeEventType::CheckoutSessionCompleted
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let session: CheckoutSessionPayload = parse_object(event)?;

        let order = match self.orders.find_by_checkout_session(&session.id).await? {
            Some(order) => order,
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    session_id = %session.id,
                    "No order for checkout session"
                );
                return Err(WebhookError::Ignored(format!(
                    "no order for checkout session {}",
                    session.id
                )));
            }
        };

        self.settlement
            .settle_paid_order(order, session.payment_intent)
            .await?;

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// payment_intent.succeeded
// ════════════════════════════════════════════════════════════════════════════════

/// Marks the order paid.
///
/// Does not create an enrollment: checkout.session.completed alone
/// carries the session correlation and is the enrollment trigger.
pub struct PaymentSucceededHandler {
    orders: Arc<dyn OrderRepository>,
    events: Arc<dyn EventPublisher>,
}

impl PaymentSucceededHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { orders, events }
    }
}

#[async_trait]
impl WebhookEventHandler for PaymentSucceededHandler {
    fn handles(&self) -> StripeEventType {
        StripeEventType::PaymentIntentSucceeded
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let intent: PaymentIntentPayload = parse_object(event)?;

        let mut order = match self.orders.find_by_payment_intent(&intent.id).await? {
            Some(order) => order,
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    "No order for payment intent"
                );
                return Err(WebhookError::Ignored(format!(
                    "no order for payment intent {}",
                    intent.id
                )));
            }
        };

        let now = Timestamp::now();
        let change = order.mark_paid(Some(intent.id.clone()), now)?;
        self.orders.update(&order).await?;

        if change.is_applied() {
            tracing::info!(
                order_id = %order.id,
                payment_intent_id = %intent.id,
                "Order marked paid from payment intent"
            );
            let event = OrderEvent::Paid {
                order_id: order.id,
                user_id: order.user_id,
                course_id: order.course_id,
                payment_intent_id: order.payment_intent_id.clone(),
                occurred_at: now,
            };
            self.events.publish(event.to_envelope()).await?;
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// payment_intent.payment_failed
// ════════════════════════════════════════════════════════════════════════════════

/// Marks the order failed with the provider's reason.
pub struct PaymentFailedHandler {
    orders: Arc<dyn OrderRepository>,
    events: Arc<dyn EventPublisher>,
}

impl PaymentFailedHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { orders, events }
    }
}

#[async_trait]
impl WebhookEventHandler for PaymentFailedHandler {
    fn handles(&self) -> StripeEventType {
        StripeEventType::PaymentIntentFailed
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let intent: PaymentIntentPayload = parse_object(event)?;

        let mut order = match self.orders.find_by_payment_intent(&intent.id).await? {
            Some(order) => order,
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    "No order for failed payment intent"
                );
                return Err(WebhookError::Ignored(format!(
                    "no order for payment intent {}",
                    intent.id
                )));
            }
        };

        let reason = intent.failure_reason();
        let now = Timestamp::now();
        let change = order.mark_failed(reason.clone(), now)?;
        self.orders.update(&order).await?;

        if change.is_applied() {
            tracing::info!(
                order_id = %order.id,
                reason = %reason,
                "Order marked failed"
            );
            let event = OrderEvent::Failed {
                order_id: order.id,
                reason,
                occurred_at: now,
            };
            self.events.publish(event.to_envelope()).await?;
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// charge.refunded
// ════════════════════════════════════════════════════════════════════════════════

/// Marks the order refunded and cancels the matching enrollment, if any.
pub struct ChargeRefundedHandler {
    orders: Arc<dyn OrderRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    events: Arc<dyn EventPublisher>,
}

impl ChargeRefundedHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            enrollments,
            events,
        }
    }
}

#[async_trait]
impl WebhookEventHandler for ChargeRefundedHandler {
    fn handles(&self) -> StripeEventType {
        StripeEventType::ChargeRefunded
    }

    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let charge: ChargePayload = parse_object(event)?;
        let payment_intent_id = charge
            .payment_intent
            .ok_or(WebhookError::MissingField("payment_intent"))?;

        let mut order = match self
            .orders
            .find_by_payment_intent(&payment_intent_id)
            .await?
        {
            Some(order) => order,
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    charge_id = %charge.id,
                    "No order for refunded charge"
                );
                return Err(WebhookError::Ignored(format!(
                    "no order for charge {}",
                    charge.id
                )));
            }
        };

        let now = Timestamp::now();
        let change = order.mark_refunded(now)?;
        self.orders.update(&order).await?;

        if change.is_applied() {
            tracing::info!(order_id = %order.id, charge_id = %charge.id, "Order refunded");
            let refunded = OrderEvent::Refunded {
                order_id: order.id,
                user_id: order.user_id,
                course_id: order.course_id,
                occurred_at: now,
            };
            self.events.publish(refunded.to_envelope()).await?;
        }

        // A refund with no matching enrollment is fine: the order still
        // moves to refunded.
        if let Some(mut enrollment) = self
            .enrollments
            .find_by_student_and_course(&order.user_id, &order.course_id)
            .await?
        {
            if enrollment.cancel(now).is_applied() {
                self.enrollments.update(&enrollment).await?;
                tracing::info!(
                    enrollment_id = %enrollment.id,
                    order_id = %order.id,
                    "Enrollment cancelled due to refund"
                );
                let cancelled = EnrollmentEvent::Cancelled {
                    enrollment_id: enrollment.id,
                    student_id: enrollment.student_id,
                    course_id: enrollment.course_id,
                    occurred_at: now,
                };
                self.events.publish(cancelled.to_envelope()).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::checkout::test_support::{
        paid_order, pending_order, InMemoryCourses, InMemoryEnrollments, InMemoryOrders,
        RecordingPublisher,
    };
    use crate::domain::checkout::OrderStatus;
    use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
    use crate::domain::foundation::{CourseId, EnrollmentId};
    use crate::domain::payments::StripeEventBuilder;
    use serde_json::json;

    fn settlement_for(
        orders: &Arc<InMemoryOrders>,
        enrollments: &Arc<InMemoryEnrollments>,
        courses: Arc<InMemoryCourses>,
        events: &Arc<RecordingPublisher>,
    ) -> Arc<OrderSettlement> {
        Arc::new(OrderSettlement::new(
            orders.clone(),
            enrollments.clone(),
            courses,
            events.clone(),
        ))
    }

    // ══════════════════════════════════════════════════════════════
    // checkout.session.completed
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn checkout_completed_settles_matching_order() {
        let (course, courses) = InMemoryCourses::with_course(2000, true);
        let mut order = pending_order(course.id, 2000);
        order.checkout_session_id = "cs_hook".to_string();
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let enrollments = Arc::new(InMemoryEnrollments::new());
        let events = Arc::new(RecordingPublisher::new());
        let handler = CheckoutCompletedHandler::new(
            orders.clone(),
            settlement_for(&orders, &enrollments, courses, &events),
        );

        let event = StripeEventBuilder::new()
            .object(json!({"id": "cs_hook", "payment_intent": "pi_hook", "payment_status": "paid"}))
            .build();

        handler.handle(&event).await.unwrap();

        let stored = orders.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        assert_eq!(stored.payment_intent_id.as_deref(), Some("pi_hook"));
        assert_eq!(enrollments.count(), 1);
    }

    #[tokio::test]
    async fn checkout_completed_without_order_is_ignored() {
        let (_, courses) = InMemoryCourses::with_course(2000, true);
        let orders = Arc::new(InMemoryOrders::new());
        let enrollments = Arc::new(InMemoryEnrollments::new());
        let events = Arc::new(RecordingPublisher::new());
        let handler = CheckoutCompletedHandler::new(
            orders.clone(),
            settlement_for(&orders, &enrollments, courses, &events),
        );

        let event = StripeEventBuilder::new()
            .object(json!({"id": "cs_orphan"}))
            .build();

        let result = handler.handle(&event).await;
        assert!(matches!(result, Err(WebhookError::Ignored(_))));
        assert_eq!(enrollments.count(), 0);
    }

    // ══════════════════════════════════════════════════════════════
    // payment_intent.succeeded
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn payment_succeeded_marks_order_paid_without_enrollment() {
        let mut order = pending_order(CourseId::new(), 1500);
        order.payment_intent_id = Some("pi_ok".to_string());
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let events = Arc::new(RecordingPublisher::new());
        let handler = PaymentSucceededHandler::new(orders.clone(), events.clone());

        let event = StripeEventBuilder::new()
            .event_type("payment_intent.succeeded")
            .object(json!({"id": "pi_ok"}))
            .build();

        handler.handle(&event).await.unwrap();

        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Paid);
        assert_eq!(events.event_types(), vec!["order.paid".to_string()]);
    }

    #[tokio::test]
    async fn payment_succeeded_unknown_intent_is_ignored() {
        let orders = Arc::new(InMemoryOrders::new());
        let handler =
            PaymentSucceededHandler::new(orders, Arc::new(RecordingPublisher::new()));

        let event = StripeEventBuilder::new()
            .event_type("payment_intent.succeeded")
            .object(json!({"id": "pi_unknown"}))
            .build();

        assert!(matches!(
            handler.handle(&event).await,
            Err(WebhookError::Ignored(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // payment_intent.payment_failed
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn payment_failed_records_provider_reason() {
        let mut order = pending_order(CourseId::new(), 1500);
        order.payment_intent_id = Some("pi_bad".to_string());
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let handler =
            PaymentFailedHandler::new(orders.clone(), Arc::new(RecordingPublisher::new()));

        let event = StripeEventBuilder::new()
            .event_type("payment_intent.payment_failed")
            .object(json!({
                "id": "pi_bad",
                "last_payment_error": {"message": "Your card was declined."}
            }))
            .build();

        handler.handle(&event).await.unwrap();

        let stored = orders.get(&order.id).unwrap();
        assert_eq!(stored.status, OrderStatus::Failed);
        assert_eq!(
            stored.failure_reason.as_deref(),
            Some("Your card was declined.")
        );
    }

    #[tokio::test]
    async fn payment_failed_defaults_reason_when_absent() {
        let mut order = pending_order(CourseId::new(), 1500);
        order.payment_intent_id = Some("pi_bad2".to_string());
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let handler =
            PaymentFailedHandler::new(orders.clone(), Arc::new(RecordingPublisher::new()));

        let event = StripeEventBuilder::new()
            .event_type("payment_intent.payment_failed")
            .object(json!({"id": "pi_bad2"}))
            .build();

        handler.handle(&event).await.unwrap();
        assert_eq!(
            orders.get(&order.id).unwrap().failure_reason.as_deref(),
            Some("Payment failed")
        );
    }

    #[tokio::test]
    async fn payment_failed_on_paid_order_is_invalid_transition() {
        let order = paid_order(CourseId::new(), 1500);
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let handler =
            PaymentFailedHandler::new(orders.clone(), Arc::new(RecordingPublisher::new()));

        let event = StripeEventBuilder::new()
            .event_type("payment_intent.payment_failed")
            .object(json!({"id": "pi_test"}))
            .build();

        let result = handler.handle(&event).await;
        assert!(matches!(result, Err(WebhookError::InvalidTransition(_))));
        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Paid);
    }

    // ══════════════════════════════════════════════════════════════
    // charge.refunded
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn charge_refunded_cancels_enrollment() {
        let order = paid_order(CourseId::new(), 2000);
        let enrollment = Enrollment::create(
            EnrollmentId::new(),
            order.user_id,
            order.course_id,
            4,
            Timestamp::now(),
        );
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let enrollments = Arc::new(InMemoryEnrollments::with_enrollment(enrollment));
        let events = Arc::new(RecordingPublisher::new());
        let handler = ChargeRefundedHandler::new(orders.clone(), enrollments.clone(), events.clone());

        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({"id": "ch_1", "payment_intent": "pi_test"}))
            .build();

        handler.handle(&event).await.unwrap();

        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Refunded);
        assert_eq!(enrollments.all()[0].status, EnrollmentStatus::Cancelled);
        assert!(events
            .event_types()
            .contains(&"enrollment.cancelled".to_string()));
    }

    #[tokio::test]
    async fn charge_refunded_without_enrollment_still_updates_order() {
        let order = paid_order(CourseId::new(), 2000);
        let orders = Arc::new(InMemoryOrders::with_order(order.clone()));
        let enrollments = Arc::new(InMemoryEnrollments::new());
        let handler = ChargeRefundedHandler::new(
            orders.clone(),
            enrollments,
            Arc::new(RecordingPublisher::new()),
        );

        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({"id": "ch_2", "payment_intent": "pi_test"}))
            .build();

        handler.handle(&event).await.unwrap();
        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Refunded);
    }

    #[tokio::test]
    async fn charge_refunded_without_intent_is_bad_request() {
        let handler = ChargeRefundedHandler::new(
            Arc::new(InMemoryOrders::new()),
            Arc::new(InMemoryEnrollments::new()),
            Arc::new(RecordingPublisher::new()),
        );

        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({"id": "ch_3"}))
            .build();

        assert!(matches!(
            handler.handle(&event).await,
            Err(WebhookError::MissingField("payment_intent"))
        ));
    }

    #[tokio::test]
    async fn charge_refunded_unknown_intent_is_ignored() {
        let handler = ChargeRefundedHandler::new(
            Arc::new(InMemoryOrders::new()),
            Arc::new(InMemoryEnrollments::new()),
            Arc::new(RecordingPublisher::new()),
        );

        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({"id": "ch_4", "payment_intent": "pi_nobody"}))
            .build();

        assert!(matches!(
            handler.handle(&event).await,
            Err(WebhookError::Ignored(_))
        ));
    }
}
