//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form
//! the vocabulary of the Skillforge domain.

mod errors;
mod events;
mod ids;
mod money;
mod percentage;
mod state_change;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId};
pub use ids::{CourseId, EnrollmentId, OrderId, UserId};
pub use money::Money;
pub use percentage::Percentage;
pub use state_change::StateChange;
pub use timestamp::Timestamp;
