use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::review::ReviewError;
use crate::svc::{SubmitReviewInput, SubmitReviewOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SubmitReviewError {
    #[error("Only students enrolled in the course may review it.")]
    NotEnrolled,

    #[error("You already reviewed this course.")]
    DuplicateReview,
}

pub(crate) async fn submit_review(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &SubmitReviewInput,
) -> Result<SubmitReviewOutput, EndpointError<SubmitReviewError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;
    let rating = u8::try_from(input.rating).map_err(|_| EndpointError::validation("Rating must be between 1 and 5."))?;

    let enrolled = ctx.enrollments.is_enrolled(&identity, &course_id).await.map_err(|e| {
        tracing::error!(error = ?e, %course_id, "Checking enrollment before review failed.");
        EndpointError::internal()
    })?;
    if !enrolled {
        return Err(EndpointError::operation(SubmitReviewError::NotEnrolled));
    }

    let review = ctx
        .reviews
        .submit(&identity, course_id, rating, input.comment.clone())
        .await
        .map_err(|err| match err {
            ReviewError::DuplicateReview => EndpointError::operation(SubmitReviewError::DuplicateReview),
            ReviewError::Validation(msg) => EndpointError::validation(msg),
            e => {
                tracing::error!(error = ?e, %course_id, "Submit review failed.");
                EndpointError::internal()
            }
        })?;

    Ok(SubmitReviewOutput {
        review_id: review.review_id.to_string(),
    })
}

impl OperationError for SubmitReviewError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::NotEnrolled => tonic::Code::FailedPrecondition,
            Self::DuplicateReview => tonic::Code::AlreadyExists,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tonic::Code;

    use super::*;
    use crate::operations::create_course::{create_course, tests::input};
    use crate::operations::enroll::enroll;
    use crate::operations::test_support::{context, user};
    use crate::svc::EnrollInput;

    pub(crate) fn review(course_id: &str, rating: u32, comment: &str) -> SubmitReviewInput {
        SubmitReviewInput {
            course_id: course_id.to_owned(),
            rating,
            comment: comment.to_owned(),
        }
    }

    /// Creates a course and enrolls the given user in it, returning the course ID.
    pub(crate) async fn enrolled_course(ctx: &Context, student: &MetadataMap) -> String {
        let (_, instructor) = user("frances");
        let created = create_course(ctx, &instructor, &input("Parallel Computing", 20)).await.unwrap();
        enroll(
            ctx,
            student,
            &EnrollInput {
                course_id: created.course_id.clone(),
            },
        )
        .await
        .unwrap();
        created.course_id
    }

    #[tokio::test]
    async fn enrolled_student_reviews_once() {
        let ctx = context();
        let (_, student) = user("john");
        let course_id = enrolled_course(&ctx, &student).await;

        submit_review(&ctx, &student, &review(&course_id, 5, "Excellent labs.")).await.unwrap();

        let err = submit_review(&ctx, &student, &review(&course_id, 1, "Second thoughts."))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::AlreadyExists);
    }

    #[tokio::test]
    async fn students_not_enrolled_cannot_review() {
        let ctx = context();
        let (_, student) = user("john");
        let (_, outsider) = user("olivia");
        let course_id = enrolled_course(&ctx, &student).await;

        let err = submit_review(&ctx, &outsider, &review(&course_id, 4, "Looks nice."))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_invalid() {
        let ctx = context();
        let (_, student) = user("john");
        let course_id = enrolled_course(&ctx, &student).await;

        for rating in [0, 6, 300] {
            let err = submit_review(&ctx, &student, &review(&course_id, rating, "Hmm."))
                .await
                .unwrap_err();
            assert_eq!(err.code(), Code::InvalidArgument);
        }
    }
}
