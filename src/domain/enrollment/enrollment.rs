//! Enrollment aggregate - one student's access grant to one course.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CourseId, EnrollmentId, Percentage, StateChange, Timestamp, UserId,
};

use super::EnrollmentStatus;

/// A student's access grant to a course's content.
///
/// At most one enrollment exists per (student, course) pair; the
/// persistence layer enforces this with a unique constraint and
/// insert-if-absent semantics. Enrollments are created only once an
/// order for the pair reaches `paid`, and move to `Cancelled` when the
/// originating order is refunded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub enrolled_at: Timestamp,
    pub progress: Percentage,
    pub lessons_completed: u32,
    pub lessons_total: u32,
    pub updated_at: Timestamp,
}

impl Enrollment {
    /// Creates a new active enrollment with zero progress.
    pub fn create(
        id: EnrollmentId,
        student_id: UserId,
        course_id: CourseId,
        lessons_total: u32,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            student_id,
            course_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now,
            progress: Percentage::ZERO,
            lessons_completed: 0,
            lessons_total,
            updated_at: now,
        }
    }

    /// Cancels the enrollment (refunded order). Idempotent.
    pub fn cancel(&mut self, now: Timestamp) -> StateChange {
        if self.status == EnrollmentStatus::Cancelled {
            return StateChange::Unchanged;
        }
        self.status = EnrollmentStatus::Cancelled;
        self.updated_at = now;
        StateChange::Applied
    }

    /// Records one completed lesson and recomputes progress.
    ///
    /// Completing the final lesson moves the enrollment to `Completed`.
    /// Cancelled enrollments ignore further progress.
    pub fn record_lesson_completed(&mut self, now: Timestamp) -> StateChange {
        if self.status == EnrollmentStatus::Cancelled {
            return StateChange::Unchanged;
        }
        if self.lessons_total > 0 && self.lessons_completed >= self.lessons_total {
            return StateChange::Unchanged;
        }

        self.lessons_completed += 1;
        self.progress = Percentage::of_counts(self.lessons_completed, self.lessons_total);
        if self.lessons_total > 0 && self.lessons_completed == self.lessons_total {
            self.status = EnrollmentStatus::Completed;
        }
        self.updated_at = now;
        StateChange::Applied
    }
}
