use course_service_core::operation_error::Infallible;
use course_service_core::EndpointError;

use super::parse_id;
use crate::context::Context;
use crate::review::average;
use crate::svc::{ListReviewsInput, ListReviewsOutput};

/// Reviews of a course, newest first, with their average rating.
pub(crate) async fn list_reviews(
    ctx: &Context,
    input: &ListReviewsInput,
) -> Result<ListReviewsOutput, EndpointError<Infallible>> {
    let course_id = parse_id(&input.course_id, "course")?;

    let reviews = ctx.reviews.list_for_course(&course_id).await.map_err(|e| {
        tracing::error!(error = ?e, %course_id, "List reviews failed.");
        EndpointError::internal()
    })?;
    let average_rating = average(&reviews);

    Ok(ListReviewsOutput {
        reviews: reviews.into_iter().map(Into::into).collect(),
        average_rating,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::submit_review::submit_review;
    use crate::operations::submit_review::tests::{enrolled_course, review};
    use crate::operations::test_support::{context, user};

    #[tokio::test]
    async fn average_over_listed_reviews() {
        let ctx = context();
        let (_, ken) = user("ken");
        let course_id = enrolled_course(&ctx, &ken).await;
        let (_, dennis) = user("dennis");
        let enroll_dennis = crate::svc::EnrollInput {
            course_id: course_id.clone(),
        };
        crate::operations::enroll::enroll(&ctx, &dennis, &enroll_dennis).await.unwrap();

        submit_review(&ctx, &ken, &review(&course_id, 5, "Great.")).await.unwrap();
        submit_review(&ctx, &dennis, &review(&course_id, 4, "Good.")).await.unwrap();

        let output = list_reviews(
            &ctx,
            &ListReviewsInput {
                course_id: course_id.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.reviews.len(), 2);
        assert_eq!(output.reviews[0].comment, "Good.");
        assert_eq!(output.average_rating, 4.5);
    }

    #[tokio::test]
    async fn course_without_reviews_averages_zero() {
        let output = list_reviews(
            &context(),
            &ListReviewsInput {
                course_id: uuid::Uuid::new_v4().to_string(),
            },
        )
        .await
        .unwrap();

        assert!(output.reviews.is_empty());
        assert_eq!(output.average_rating, 0.0);
    }
}
