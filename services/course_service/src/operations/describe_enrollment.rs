use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::enrollment::EnrollmentError;
use crate::svc::{DescribeEnrollmentInput, DescribeEnrollmentOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DescribeEnrollmentError {
    #[error("Course not found.")]
    CourseNotFound,
}

/// Authoritative enrollment state of the caller for a course, for clients to re-fetch after a failure.
pub(crate) async fn describe_enrollment(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &DescribeEnrollmentInput,
) -> Result<DescribeEnrollmentOutput, EndpointError<DescribeEnrollmentError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;

    let status = ctx
        .enrollments
        .status(&identity, &course_id)
        .await
        .map_err(|err| match err {
            EnrollmentError::CourseNotFound => EndpointError::operation(DescribeEnrollmentError::CourseNotFound),
            e => {
                tracing::error!(error = ?e, %course_id, "Describe enrollment failed.");
                EndpointError::internal()
            }
        })?;

    Ok(DescribeEnrollmentOutput {
        enrolled: status.enrolled,
        seats_remaining: status.seats_remaining,
    })
}

impl OperationError for DescribeEnrollmentError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::CourseNotFound => tonic::Code::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use tonic::Code;

    use super::*;
    use crate::operations::create_course::{create_course, tests::input};
    use crate::operations::enroll::enroll;
    use crate::operations::test_support::{context, user};
    use crate::svc::EnrollInput;

    #[tokio::test]
    async fn reflects_the_stored_state() {
        let ctx = context();
        let (_, instructor) = user("tim");
        let (_, metadata) = user("vint");
        let created = create_course(&ctx, &instructor, &input("Networking", 2)).await.unwrap();
        let describe = DescribeEnrollmentInput {
            course_id: created.course_id.clone(),
        };

        let before = describe_enrollment(&ctx, &metadata, &describe).await.unwrap();
        enroll(
            &ctx,
            &metadata,
            &EnrollInput {
                course_id: created.course_id,
            },
        )
        .await
        .unwrap();
        let after = describe_enrollment(&ctx, &metadata, &describe).await.unwrap();

        assert!(!before.enrolled);
        assert_eq!(before.seats_remaining, 2);
        assert!(after.enrolled);
        assert_eq!(after.seats_remaining, 1);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let ctx = context();
        let (_, metadata) = user("vint");

        let err = describe_enrollment(
            &ctx,
            &metadata,
            &DescribeEnrollmentInput {
                course_id: uuid::Uuid::new_v4().to_string(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), Code::NotFound);
    }
}
