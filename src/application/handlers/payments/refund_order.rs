//! RefundOrderHandler - Command handler for operator-initiated refunds.
//!
//! Creates the refund at the provider and applies the same local
//! transition the charge.refunded webhook would; the later webhook for
//! the same charge then lands on an already-refunded order and no-ops.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Order, OrderEvent};
use crate::domain::enrollment::EnrollmentEvent;
use crate::domain::foundation::{OrderId, Timestamp};
use crate::ports::{
    EnrollmentRepository, EventPublisher, OrderRepository, PaymentProvider, Refund, RefundRequest,
};

/// Command to refund an order.
#[derive(Debug, Clone)]
pub struct RefundOrderCommand {
    pub order_id: OrderId,
    /// Partial refund amount in minor units; `None` refunds in full.
    pub amount_cents: Option<i64>,
}

/// Result of a refund.
#[derive(Debug, Clone)]
pub struct RefundOrderResult {
    pub order: Order,
    pub refund: Refund,
}

/// Handler for refund creation.
pub struct RefundOrderHandler {
    orders: Arc<dyn OrderRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    events: Arc<dyn EventPublisher>,
}

impl RefundOrderHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            enrollments,
            payment_provider,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: RefundOrderCommand,
    ) -> Result<RefundOrderResult, CheckoutError> {
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| CheckoutError::order_not_found(cmd.order_id.to_string()))?;

        if !order.is_paid() {
            return Err(CheckoutError::invalid_state(order.status.as_str(), "refund"));
        }

        let payment_intent_id = order.payment_intent_id.clone().ok_or_else(|| {
            CheckoutError::validation("payment_intent_id", "Order has no payment intent")
        })?;

        if let Some(amount) = cmd.amount_cents {
            if amount <= 0 || amount > order.amount.amount_cents() {
                return Err(CheckoutError::validation(
                    "amount_cents",
                    "Refund amount must be positive and at most the order amount",
                ));
            }
        }

        let refund = self
            .payment_provider
            .create_refund(RefundRequest {
                payment_intent_id,
                amount_cents: cmd.amount_cents,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, order_id = %order.id, "Failed to create refund");
                CheckoutError::payment_provider(e.to_string())
            })?;

        let now = Timestamp::now();
        let change = order.mark_refunded(now)?;
        self.orders.update(&order).await?;

        if change.is_applied() {
            tracing::info!(
                order_id = %order.id,
                refund_id = %refund.id,
                "Refund created"
            );
            let event = OrderEvent::Refunded {
                order_id: order.id,
                user_id: order.user_id,
                course_id: order.course_id,
                occurred_at: now,
            };
            self.events.publish(event.to_envelope()).await?;
        }

        if let Some(mut enrollment) = self
            .enrollments
            .find_by_student_and_course(&order.user_id, &order.course_id)
            .await?
        {
            if enrollment.cancel(now).is_applied() {
                self.enrollments.update(&enrollment).await?;
                let event = EnrollmentEvent::Cancelled {
                    enrollment_id: enrollment.id,
                    student_id: enrollment.student_id,
                    course_id: enrollment.course_id,
                    occurred_at: now,
                };
                self.events.publish(event.to_envelope()).await?;
            }
        }

        Ok(RefundOrderResult { order, refund })
    }
}
