//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `CourseReader` - Read access to the course catalog
//! - `OrderRepository` - Order persistence
//! - `EnrollmentRepository` - Enrollment persistence (unique per student/course)
//! - `WebhookEventRepository` - Webhook idempotency tracking
//! - `PaymentProvider` - Hosted checkout and refunds
//! - `EventPublisher` - Domain event publication

mod course_reader;
mod enrollment_repository;
mod event_publisher;
mod order_repository;
mod payment_provider;
mod webhook_event_repository;

pub use course_reader::{CourseReader, CourseSummary};
pub use enrollment_repository::{EnrollmentInsert, EnrollmentRepository};
pub use event_publisher::EventPublisher;
pub use order_repository::OrderRepository;
pub use payment_provider::{
    CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentProvider, ProviderCheckoutSession,
    Refund, RefundRequest, SessionPaymentStatus,
};
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
