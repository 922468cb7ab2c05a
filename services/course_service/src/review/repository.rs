use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::Review;

#[derive(Debug, Error)]
pub enum ReviewRepositoryError {
    #[error("The user already reviewed this course.")]
    Duplicate,

    #[error(transparent)]
    Datastore(#[from] Box<dyn Error + Send + Sync>),
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Stores a review; fails with [`ReviewRepositoryError::Duplicate`] if the user already reviewed the course.
    async fn create_review(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Every review of the course, in no particular order.
    async fn list_for_course(&self, course_id: &Uuid) -> Result<Vec<Review>, ReviewRepositoryError>;
}
