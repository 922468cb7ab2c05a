use course_service_core::{EndpointError, OperationError};
use thiserror::Error;
use tonic::metadata::MetadataMap;

use super::{authenticate, parse_id};
use crate::context::Context;
use crate::enrollment::EnrollmentError;
use crate::svc::{UnenrollInput, UnenrollOutput};

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UnenrollError {
    #[error("Not enrolled in this course.")]
    NotEnrolled,

    #[error("You were unenrolled, but the seat could not be released.")]
    SeatsNotReleased,
}

pub(crate) async fn unenroll(
    ctx: &Context,
    metadata: &MetadataMap,
    input: &UnenrollInput,
) -> Result<UnenrollOutput, EndpointError<UnenrollError>> {
    let identity = authenticate(ctx, metadata)?;
    let course_id = parse_id(&input.course_id, "course")?;

    let seats_remaining = ctx
        .enrollments
        .unenroll(&identity, course_id)
        .await
        .map_err(|err| match err {
            EnrollmentError::NotEnrolled => EndpointError::operation(UnenrollError::NotEnrolled),
            EnrollmentError::SeatsNotReleased => EndpointError::operation(UnenrollError::SeatsNotReleased),
            e => {
                tracing::error!(error = ?e, %course_id, "Unenroll failed.");
                EndpointError::internal()
            }
        })?;

    Ok(UnenrollOutput { seats_remaining })
}

impl OperationError for UnenrollError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::NotEnrolled => tonic::Code::FailedPrecondition,
            Self::SeatsNotReleased => tonic::Code::Internal,
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
    async fn unenroll_gives_the_seat_back() {
        let ctx = context();
        let (_, instructor) = user("grace");
        let (_, metadata) = user("alan");
        let created = create_course(&ctx, &instructor, &input("Compilers", 10)).await.unwrap();
        enroll(
            &ctx,
            &metadata,
            &EnrollInput {
                course_id: created.course_id.clone(),
            },
        )
        .await
        .unwrap();
        let input = UnenrollInput {
            course_id: created.course_id,
        };

        assert_eq!(unenroll(&ctx, &metadata, &input).await.unwrap().seats_remaining, 10);
        assert_eq!(
            unenroll(&ctx, &metadata, &input).await.unwrap_err().code(),
            Code::FailedPrecondition
        );
    }
}
