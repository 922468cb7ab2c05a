use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::Enrollment;

#[derive(Debug, Error)]
pub enum EnrollmentStoreError {
    #[error("The user is already enrolled in this course.")]
    Duplicate,

    #[error("Enrollment not found.")]
    NotFound,

    #[error("The user already holds {0} enrollments.")]
    LimitReached(usize),

    #[error(transparent)]
    Datastore(#[from] Box<dyn Error + Send + Sync>),
}

/// Storage of enrollment records, unique per (user, course).
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_by_user_and_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Option<Enrollment>, EnrollmentStoreError>;

    async fn count_for_user(&self, user_id: &Uuid) -> Result<usize, EnrollmentStoreError>;

    /// Stores a new enrollment; fails with [`EnrollmentStoreError::Duplicate`] if the user already has one for
    /// the same course and with [`EnrollmentStoreError::LimitReached`] if the user already holds
    /// `max_enrollments`. Both checks are atomic with the write.
    async fn create(&self, enrollment: Enrollment, max_enrollments: usize) -> Result<Enrollment, EnrollmentStoreError>;

    /// Removes the record with this enrollment's ID; fails with [`EnrollmentStoreError::NotFound`] if it is gone.
    async fn remove(&self, enrollment: &Enrollment) -> Result<(), EnrollmentStoreError>;

    /// Every enrollment of the user, oldest first. Each call runs a fresh query.
    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, EnrollmentStoreError>;
}
