use chrono::{DateTime, Utc};
use typed_builder::TypedBuilder;
use uuid::Uuid;
use validator::Validate;

/// A rating with a comment, left by a user on a course. A user reviews a course at most once.
#[derive(Debug, Clone, PartialEq, TypedBuilder, Validate)]
pub struct Review {
    #[builder(default = Uuid::new_v4())]
    pub review_id: Uuid,

    pub user_id: Uuid,

    #[builder(setter(into))]
    pub user_email: String,

    pub course_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: u8,

    #[builder(setter(into))]
    #[validate(length(min = 1, message = "Comment is required."))]
    pub comment: String,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}
