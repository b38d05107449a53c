//! In-memory port implementations shared by handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::checkout::{Order, OrderStatus};
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, EventEnvelope, Money, OrderId, Timestamp, UserId,
};
use crate::ports::{
    CheckoutSessionRequest, CourseReader, CourseSummary, EnrollmentInsert, EnrollmentRepository,
    EventPublisher, OrderRepository, PaymentError, PaymentProvider, ProviderCheckoutSession,
    Refund, RefundRequest, SaveResult, SessionPaymentStatus, WebhookEventRecord,
    WebhookEventRepository,
};

// ════════════════════════════════════════════════════════════════════════════════
// Fixtures
// ════════════════════════════════════════════════════════════════════════════════

pub fn pending_order(course_id: CourseId, amount_cents: i64) -> Order {
    Order::create_pending(
        OrderId::new(),
        UserId::new(),
        course_id,
        Money::usd(amount_cents).unwrap(),
        format!("cs_test_{}", OrderId::new()),
        Timestamp::now(),
    )
}

pub fn paid_order(course_id: CourseId, amount_cents: i64) -> Order {
    let mut order = pending_order(course_id, amount_cents);
    order
        .mark_paid(Some("pi_test".to_string()), Timestamp::now())
        .unwrap();
    order
}

// ════════════════════════════════════════════════════════════════════════════════
// Orders
// ════════════════════════════════════════════════════════════════════════════════

pub struct InMemoryOrders {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_order(order: Order) -> Self {
        let repo = Self::new();
        repo.orders.lock().unwrap().insert(order.id, order);
        repo
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.lock().unwrap().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        if !orders.contains_key(&order.id) {
            return Err(DomainError::new(ErrorCode::OrderNotFound, "Order not found"));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().get(id).cloned())
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.checkout_session_id == session_id)
            .cloned())
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn revenue_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| {
                o.status == OrderStatus::Paid
                    && !o.created_at.is_before(&start)
                    && !o.created_at.is_after(&end)
            })
            .map(|o| o.amount.amount_cents())
            .sum())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Enrollments
// ════════════════════════════════════════════════════════════════════════════════

pub struct InMemoryEnrollments {
    enrollments: Mutex<Vec<Enrollment>>,
}

impl InMemoryEnrollments {
    pub fn new() -> Self {
        Self {
            enrollments: Mutex::new(Vec::new()),
        }
    }

    pub fn with_enrollment(enrollment: Enrollment) -> Self {
        Self {
            enrollments: Mutex::new(vec![enrollment]),
        }
    }

    pub fn count(&self) -> usize {
        self.enrollments.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Enrollment> {
        self.enrollments.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollments {
    async fn insert_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> Result<EnrollmentInsert, DomainError> {
        let mut enrollments = self.enrollments.lock().unwrap();
        let exists = enrollments.iter().any(|e| {
            e.student_id == enrollment.student_id && e.course_id == enrollment.course_id
        });
        if exists {
            return Ok(EnrollmentInsert::AlreadyEnrolled);
        }
        enrollments.push(enrollment.clone());
        Ok(EnrollmentInsert::Inserted)
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut enrollments = self.enrollments.lock().unwrap();
        match enrollments.iter_mut().find(|e| e.id == enrollment.id) {
            Some(existing) => {
                *existing = enrollment.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::EnrollmentNotFound,
                "Enrollment not found",
            )),
        }
    }

    async fn find_by_student_and_course(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.student_id == student_id && &e.course_id == course_id)
            .cloned())
    }

    async fn is_enrolled(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .find_by_student_and_course(student_id, course_id)
            .await?
            .is_some())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Courses
// ════════════════════════════════════════════════════════════════════════════════

pub struct InMemoryCourses {
    courses: Mutex<HashMap<CourseId, CourseSummary>>,
}

impl InMemoryCourses {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            courses: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_course(price_cents: i64, published: bool) -> (CourseSummary, Arc<Self>) {
        let course = CourseSummary {
            id: CourseId::new(),
            title: "Intro to Rust".to_string(),
            description: Some("Ownership without tears".to_string()),
            price: Money::usd(price_cents).unwrap(),
            published,
            lessons_total: 12,
        };
        let reader = Self::empty();
        reader
            .courses
            .lock()
            .unwrap()
            .insert(course.id, course.clone());
        (course, reader)
    }
}

#[async_trait]
impl CourseReader for InMemoryCourses {
    async fn find(&self, id: &CourseId) -> Result<Option<CourseSummary>, DomainError> {
        Ok(self.courses.lock().unwrap().get(id).cloned())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

pub struct RecordingPublisher {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook event store
// ════════════════════════════════════════════════════════════════════════════════

pub struct InMemoryWebhookEvents {
    records: Mutex<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryWebhookEvents {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEvents {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.lock().unwrap().get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.event_id) {
            Ok(SaveResult::AlreadyExists)
        } else {
            records.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before - records.len()) as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payment provider
// ════════════════════════════════════════════════════════════════════════════════

pub struct StubPaymentProvider {
    pub session: Mutex<Option<ProviderCheckoutSession>>,
    pub fail_create: bool,
}

impl StubPaymentProvider {
    pub fn returning_session(session_id: &str, payment_status: SessionPaymentStatus) -> Self {
        Self {
            session: Mutex::new(Some(ProviderCheckoutSession {
                id: session_id.to_string(),
                url: Some(format!("https://checkout.stripe.com/pay/{}", session_id)),
                payment_status,
                payment_intent_id: Some("pi_stub".to_string()),
                expires_at: Some(1_704_153_600),
            })),
            fail_create: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            session: Mutex::new(None),
            fail_create: true,
        }
    }
}

#[async_trait]
impl PaymentProvider for StubPaymentProvider {
    async fn create_checkout_session(
        &self,
        _request: CheckoutSessionRequest,
    ) -> Result<ProviderCheckoutSession, PaymentError> {
        if self.fail_create {
            return Err(PaymentError::network("connection refused"));
        }
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PaymentError::provider("no stub session configured"))
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ProviderCheckoutSession>, PaymentError> {
        Ok(self
            .session
            .lock()
            .unwrap()
            .clone()
            .filter(|s| s.id == session_id))
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, PaymentError> {
        if self.fail_create {
            return Err(PaymentError::network("connection refused"));
        }
        Ok(Refund {
            id: format!("re_{}", request.payment_intent_id),
            status: "succeeded".to_string(),
        })
    }
}
