//! Order aggregate - one purchase attempt for a course.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Money, OrderId, StateChange, Timestamp, UserId};

use super::{CheckoutError, OrderStatus};

/// A purchase attempt for a course, tracked through
/// pending/paid/failed/refunded states.
///
/// Orders are created `Pending` when checkout starts and transition only
/// in response to external payment confirmation. Transition methods are
/// idempotent: repeating a transition the order has already taken returns
/// `StateChange::Unchanged` so duplicate webhook deliveries and the
/// redirect/webhook convergence race stay harmless.
///
/// Orders and enrollments are correlated only by the (user, course) pair;
/// there is no direct link between the two aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub amount: Money,
    pub status: OrderStatus,
    /// Hosted checkout session id assigned by the payment provider.
    pub checkout_session_id: String,
    /// Payment intent id, known once the provider reports payment.
    pub payment_intent_id: Option<String>,
    /// Provider-reported reason for a failed payment.
    pub failure_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Creates a new pending order for a started checkout.
    pub fn create_pending(
        id: OrderId,
        user_id: UserId,
        course_id: CourseId,
        amount: Money,
        checkout_session_id: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            course_id,
            amount,
            status: OrderStatus::Pending,
            checkout_session_id: checkout_session_id.into(),
            payment_intent_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the order paid after external payment confirmation.
    ///
    /// Valid from `Pending` and `Failed` (a retried payment can succeed
    /// after an earlier failure). Already-paid orders are left unchanged,
    /// though a newly learned payment intent id is still recorded.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidState` for refunded orders.
    pub fn mark_paid(
        &mut self,
        payment_intent_id: Option<String>,
        now: Timestamp,
    ) -> Result<StateChange, CheckoutError> {
        match self.status {
            OrderStatus::Pending | OrderStatus::Failed => {
                self.status = OrderStatus::Paid;
                if payment_intent_id.is_some() {
                    self.payment_intent_id = payment_intent_id;
                }
                self.failure_reason = None;
                self.updated_at = now;
                Ok(StateChange::Applied)
            }
            OrderStatus::Paid => {
                if self.payment_intent_id.is_none() && payment_intent_id.is_some() {
                    self.payment_intent_id = payment_intent_id;
                    self.updated_at = now;
                }
                Ok(StateChange::Unchanged)
            }
            OrderStatus::Refunded => Err(CheckoutError::invalid_state(
                self.status.as_str(),
                "mark paid",
            )),
        }
    }

    /// Marks the order failed, recording the provider's reason.
    ///
    /// Repeating a failure refreshes the recorded reason. A settled
    /// (paid or refunded) order refuses the transition: the provider
    /// does not flip a completed payment back to failed.
    pub fn mark_failed(
        &mut self,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<StateChange, CheckoutError> {
        match self.status {
            OrderStatus::Pending => {
                self.status = OrderStatus::Failed;
                self.failure_reason = Some(reason.into());
                self.updated_at = now;
                Ok(StateChange::Applied)
            }
            OrderStatus::Failed => {
                self.failure_reason = Some(reason.into());
                self.updated_at = now;
                Ok(StateChange::Unchanged)
            }
            OrderStatus::Paid | OrderStatus::Refunded => Err(CheckoutError::invalid_state(
                self.status.as_str(),
                "mark failed",
            )),
        }
    }

    /// Marks the order refunded.
    ///
    /// Valid only from `Paid`; already-refunded orders are unchanged.
    pub fn mark_refunded(&mut self, now: Timestamp) -> Result<StateChange, CheckoutError> {
        match self.status {
            OrderStatus::Paid => {
                self.status = OrderStatus::Refunded;
                self.updated_at = now;
                Ok(StateChange::Applied)
            }
            OrderStatus::Refunded => Ok(StateChange::Unchanged),
            OrderStatus::Pending | OrderStatus::Failed => Err(CheckoutError::invalid_state(
                self.status.as_str(),
                "refund",
            )),
        }
    }

    /// Returns true once the provider confirmed payment.
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}
