//! EnrollmentRepository port - Enrollment persistence.
//!
//! ## Uniqueness
//!
//! At most one enrollment exists per (student, course) pair, enforced by
//! a unique constraint at the persistence layer. `insert_if_absent` is
//! the only way to create an enrollment: a constraint conflict is not an
//! error but an `AlreadyEnrolled` outcome, so the two settlement paths
//! (webhook and success redirect) can race without producing duplicates.

use async_trait::async_trait;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Outcome of an insert-if-absent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentInsert {
    /// The enrollment was inserted (first writer).
    Inserted,
    /// An enrollment for (student, course) already exists.
    AlreadyEnrolled,
}

/// Repository port for Enrollment persistence.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert the enrollment unless one already exists for its
    /// (student, course) pair.
    ///
    /// Implementations must resolve the check-and-insert atomically
    /// (e.g., `ON CONFLICT DO NOTHING` against the unique constraint).
    async fn insert_if_absent(
        &self,
        enrollment: &Enrollment,
    ) -> Result<EnrollmentInsert, DomainError>;

    /// Update an existing enrollment.
    ///
    /// # Errors
    ///
    /// - `EnrollmentNotFound` if the enrollment doesn't exist
    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    /// Find the enrollment for a (student, course) pair.
    async fn find_by_student_and_course(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError>;

    /// True if the student holds any enrollment for the course.
    async fn is_enrolled(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn EnrollmentRepository) {}
    }

    #[test]
    fn insert_outcomes_are_distinct() {
        assert_ne!(EnrollmentInsert::Inserted, EnrollmentInsert::AlreadyEnrolled);
    }
}
