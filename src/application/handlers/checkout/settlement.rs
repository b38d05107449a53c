//! Shared settlement routine for paid orders.
//!
//! Both convergence paths - the asynchronous webhook and the browser's
//! success redirect - end in the same state transition: order marked
//! paid, enrollment created if absent. The two paths differ only in how
//! they establish trust (signed payload vs. provider re-verification);
//! the transition itself lives here exactly once.

use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, Order, OrderEvent};
use crate::domain::enrollment::{Enrollment, EnrollmentEvent};
use crate::domain::foundation::{EnrollmentId, Timestamp};
use crate::ports::{
    CourseReader, EnrollmentInsert, EnrollmentRepository, EventPublisher, OrderRepository,
};

/// Result of settling a paid order.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub order: Order,
    pub enrollment: Enrollment,
    /// True when this settlement created the enrollment (first writer).
    pub enrollment_created: bool,
}

/// Applies the "order paid, enrollment exists" end state.
///
/// Idempotent end to end: a second invocation for the same order leaves
/// the order `paid` and finds the existing enrollment via the
/// persistence-level uniqueness on (student, course).
pub struct OrderSettlement {
    orders: Arc<dyn OrderRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    courses: Arc<dyn CourseReader>,
    events: Arc<dyn EventPublisher>,
}

impl OrderSettlement {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        courses: Arc<dyn CourseReader>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders,
            enrollments,
            courses,
            events,
        }
    }

    /// Marks the order paid and ensures an enrollment exists for its
    /// (user, course) pair.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the order is refunded
    /// - `Infrastructure` on persistence failure
    pub async fn settle_paid_order(
        &self,
        mut order: Order,
        payment_intent_id: Option<String>,
    ) -> Result<SettlementOutcome, CheckoutError> {
        let now = Timestamp::now();
        let change = order.mark_paid(payment_intent_id, now)?;

        self.orders.update(&order).await?;

        if change.is_applied() {
            tracing::info!(
                order_id = %order.id,
                session_id = %order.checkout_session_id,
                "Order marked paid"
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

        // Lesson count seeds the progress counters; a course that has
        // disappeared from the catalog still gets an enrollment.
        let lessons_total = self
            .courses
            .find(&order.course_id)
            .await?
            .map(|c| c.lessons_total)
            .unwrap_or(0);

        let candidate = Enrollment::create(
            EnrollmentId::new(),
            order.user_id,
            order.course_id,
            lessons_total,
            now,
        );

        match self.enrollments.insert_if_absent(&candidate).await? {
            EnrollmentInsert::Inserted => {
                tracing::info!(
                    order_id = %order.id,
                    enrollment_id = %candidate.id,
                    "Enrollment created after payment"
                );
                let event = EnrollmentEvent::Created {
                    enrollment_id: candidate.id,
                    student_id: candidate.student_id,
                    course_id: candidate.course_id,
                    occurred_at: now,
                };
                self.events.publish(event.to_envelope()).await?;

                Ok(SettlementOutcome {
                    order,
                    enrollment: candidate,
                    enrollment_created: true,
                })
            }
            EnrollmentInsert::AlreadyEnrolled => {
                let existing = self
                    .enrollments
                    .find_by_student_and_course(&order.user_id, &order.course_id)
                    .await?
                    .ok_or_else(|| {
                        CheckoutError::infrastructure(
                            "enrollment missing after uniqueness conflict",
                        )
                    })?;

                Ok(SettlementOutcome {
                    order,
                    enrollment: existing,
                    enrollment_created: false,
                })
            }
        }
    }
}
