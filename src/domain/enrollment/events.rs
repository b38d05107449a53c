//! Enrollment domain events.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::foundation::{CourseId, EnrollmentId, EventEnvelope, Timestamp, UserId};

/// Events emitted by enrollment state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnrollmentEvent {
    /// A paid order produced a new enrollment.
    Created {
        enrollment_id: EnrollmentId,
        student_id: UserId,
        course_id: CourseId,
        occurred_at: Timestamp,
    },
    /// The originating order was refunded.
    Cancelled {
        enrollment_id: EnrollmentId,
        student_id: UserId,
        course_id: CourseId,
        occurred_at: Timestamp,
    },
}

impl EnrollmentEvent {
    /// Event type string used for routing.
    pub fn event_type(&self) -> &'static str {
        match self {
            EnrollmentEvent::Created { .. } => "enrollment.created",
            EnrollmentEvent::Cancelled { .. } => "enrollment.cancelled",
        }
    }

    fn enrollment_id(&self) -> EnrollmentId {
        match self {
            EnrollmentEvent::Created { enrollment_id, .. }
            | EnrollmentEvent::Cancelled { enrollment_id, .. } => *enrollment_id,
        }
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            EnrollmentEvent::Created { occurred_at, .. }
            | EnrollmentEvent::Cancelled { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps the event in a transport envelope.
    pub fn to_envelope(&self) -> EventEnvelope {
        let mut envelope = EventEnvelope::new(
            self.event_type(),
            self.enrollment_id().to_string(),
            "Enrollment",
            serde_json::to_value(self).unwrap_or_else(|_| json!(null)),
        );
        envelope.occurred_at = self.occurred_at();
        envelope
    }
}
