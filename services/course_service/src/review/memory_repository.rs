use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Review, ReviewRepository, ReviewRepositoryError};

/// In-process reviews keyed by (course, user). Clones share the same records.
#[derive(Clone, Default)]
pub struct InMemoryReviews {
    reviews: Arc<Mutex<HashMap<(Uuid, Uuid), Review>>>,
}

impl InMemoryReviews {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn create_review(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut reviews = self.reviews.lock().await;
        let key = (review.course_id, review.user_id);
        if reviews.contains_key(&key) {
            return Err(ReviewRepositoryError::Duplicate);
        }
        reviews.insert(key, review.clone());
        Ok(())
    }

    async fn list_for_course(&self, course_id: &Uuid) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(self
            .reviews
            .lock()
            .await
            .values()
            .filter(|r| &r.course_id == course_id)
            .cloned()
            .collect())
    }
}
