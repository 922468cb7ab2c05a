use async_trait::async_trait;
use aws_sdk_dynamodb::error::{PutItemError, PutItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use common_macros::hash_map;
use course_service_core::ddb::put_item::{PutItem, PutItemInput};
use course_service_core::ddb::query::{Query, QueryInput};
use course_service_core::ddb::{Item, ItemError};
use uuid::Uuid;

use super::{Review, ReviewRepository, ReviewRepositoryError};

mod attr {
    pub const REVIEW_ID: &str = "ReviewId";
    pub const COURSE_ID: &str = "CourseId";
    pub const USER_ACCOUNT_ID: &str = "UserAccountId";
    pub const USER_EMAIL: &str = "UserEmail";
    pub const RATING: &str = "Rating";
    pub const COMMENT: &str = "Comment";
    pub const CREATED_AT: &str = "CreatedAt";
}

pub trait ReviewDdbClient: PutItem + Query + Send + Sync {}
impl<T: PutItem + Query + Send + Sync> ReviewDdbClient for T {}

/// Reviews stored under (`CourseId`, `UserAccountId`), so the key enforces one review per user and course.
pub struct DdbReviewRepository<T: ReviewDdbClient> {
    ddb: T,
    reviews_table_name: String,
}

impl From<&Review> for Item {
    fn from(review: &Review) -> Self {
        Item::new()
            .with_uuid(attr::REVIEW_ID, &review.review_id)
            .with_uuid(attr::COURSE_ID, &review.course_id)
            .with_uuid(attr::USER_ACCOUNT_ID, &review.user_id)
            .with_s(attr::USER_EMAIL, review.user_email.as_str())
            .with_n(attr::RATING, review.rating)
            .with_s(attr::COMMENT, review.comment.as_str())
            .with_timestamp(attr::CREATED_AT, &review.created_at)
    }
}

impl TryFrom<Item> for Review {
    type Error = ItemError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        Ok(Review {
            review_id: item.uuid(attr::REVIEW_ID)?,
            user_id: item.uuid(attr::USER_ACCOUNT_ID)?,
            user_email: item.s(attr::USER_EMAIL)?.to_owned(),
            course_id: item.uuid(attr::COURSE_ID)?,
            rating: item.n(attr::RATING)?,
            comment: item.s(attr::COMMENT)?.to_owned(),
            created_at: item.timestamp(attr::CREATED_AT)?,
        })
    }
}

impl<T: ReviewDdbClient> DdbReviewRepository<T> {
    pub fn new(ddb: T, reviews_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            reviews_table_name: reviews_table_name.into(),
        }
    }
}

#[async_trait]
impl<T: ReviewDdbClient> ReviewRepository for DdbReviewRepository<T> {
    async fn create_review(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let put_item_input = PutItemInput::builder()
            .table_name(self.reviews_table_name.as_str())
            .item(Item::from(review))
            .condition_expression(format!("attribute_not_exists({})", attr::USER_ACCOUNT_ID))
            .build();

        self.ddb.put_item(put_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    PutItemError {
                        kind: PutItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => ReviewRepositoryError::Duplicate,
            e => ReviewRepositoryError::Datastore(e.into()),
        })?;

        Ok(())
    }

    async fn list_for_course(&self, course_id: &Uuid) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut reviews = vec![];
        let mut start = None;

        loop {
            let query_input = QueryInput::builder()
                .table_name(self.reviews_table_name.as_str())
                .key_condition_expression(format!("{} = :course_id", attr::COURSE_ID))
                .expression_attribute_values(hash_map! {
                    ":course_id".to_owned() => AttributeValue::S(course_id.to_string()),
                })
                .exclusive_start_key(start)
                .build();
            let output = self
                .ddb
                .query(query_input)
                .await
                .map_err(|e| ReviewRepositoryError::Datastore(e.into()))?;

            for item in output.items.unwrap_or_default() {
                let review = Review::try_from(Item::from(item)).map_err(|e| ReviewRepositoryError::Datastore(e.into()))?;
                reviews.push(review);
            }

            match output.last_evaluated_key {
                Some(key) => start = Some(key),
                None => return Ok(reviews),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::error::QueryError;
    use aws_sdk_dynamodb::output::{PutItemOutput, QueryOutput};

    use super::*;

    struct FakeReviews {
        stored: Vec<HashMap<String, AttributeValue>>,
    }

    #[async_trait]
    impl PutItem for FakeReviews {
        async fn put_item(&self, _: PutItemInput) -> Result<PutItemOutput, SdkError<PutItemError>> {
            Ok(PutItemOutput::builder().build())
        }
    }

    #[async_trait]
    impl Query for FakeReviews {
        async fn query(&self, _: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
            Ok(QueryOutput::builder().set_items(Some(self.stored.clone())).build())
        }
    }

    #[tokio::test]
    async fn reviews_are_read_back_from_items() {
        let review = Review::builder()
            .user_id(Uuid::new_v4())
            .user_email("margaret@example.com")
            .course_id(Uuid::new_v4())
            .rating(5)
            .comment("Best course on the catalog.")
            .build();
        let repository = DdbReviewRepository::new(
            FakeReviews {
                stored: vec![Item::from(&review).into()],
            },
            "CourseReviews",
        );

        let listed = repository.list_for_course(&review.course_id).await.unwrap();

        assert_eq!(listed, vec![review]);
    }

    #[tokio::test]
    async fn corrupt_rating_is_a_datastore_error() {
        let item = Item::new()
            .with_uuid(attr::REVIEW_ID, &Uuid::new_v4())
            .with_uuid(attr::COURSE_ID, &Uuid::new_v4())
            .with_uuid(attr::USER_ACCOUNT_ID, &Uuid::new_v4())
            .with_s(attr::USER_EMAIL, "x@example.com")
            .with_s(attr::RATING, "five");
        let repository = DdbReviewRepository::new(FakeReviews { stored: vec![item.into()] }, "CourseReviews");

        assert!(matches!(
            repository.list_for_course(&Uuid::new_v4()).await,
            Err(ReviewRepositoryError::Datastore(_))
        ));
    }
}
