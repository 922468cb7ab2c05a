use std::error::Error;
use std::sync::Arc;

use course_service_core::auth::Identity;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::{Review, ReviewRepository, ReviewRepositoryError};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("You already reviewed this course.")]
    DuplicateReview,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Datastore(Box<dyn Error + Send + Sync>),
}

impl From<ReviewRepositoryError> for ReviewError {
    fn from(err: ReviewRepositoryError) -> Self {
        match err {
            ReviewRepositoryError::Duplicate => Self::DuplicateReview,
            ReviewRepositoryError::Datastore(e) => Self::Datastore(e),
        }
    }
}

/// Course reviews and their average rating. The average is computed from the stored reviews on every read.
#[derive(Clone)]
pub struct ReviewAggregator {
    repository: Arc<dyn ReviewRepository>,
}

impl ReviewAggregator {
    pub fn new(repository: Arc<dyn ReviewRepository>) -> Self {
        Self { repository }
    }

    #[tracing::instrument(skip(self, identity, comment), fields(user_id = %identity.user_id()))]
    pub async fn submit(
        &self,
        identity: &Identity,
        course_id: Uuid,
        rating: u8,
        comment: String,
    ) -> Result<Review, ReviewError> {
        let review = Review::builder()
            .user_id(*identity.user_id())
            .user_email(identity.email())
            .course_id(course_id)
            .rating(rating)
            .comment(comment.trim())
            .build();
        review.validate().map_err(|e| ReviewError::Validation(e.to_string()))?;

        self.repository.create_review(&review).await?;
        tracing::info!(review_id = %review.review_id, rating, "Review submitted.");

        Ok(review)
    }

    /// Reviews of the course, newest first.
    pub async fn list_for_course(&self, course_id: &Uuid) -> Result<Vec<Review>, ReviewError> {
        let mut reviews = self.repository.list_for_course(course_id).await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    pub async fn average_rating(&self, course_id: &Uuid) -> Result<f64, ReviewError> {
        Ok(average(&self.repository.list_for_course(course_id).await?))
    }
}

/// Arithmetic mean of the ratings, `0.0` when there are none.
pub fn average(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    f64::from(total) / reviews.len() as f64
}
