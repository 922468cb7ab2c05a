use course_service_core::operation_error::Infallible;
use course_service_core::{simple_err_map, EndpointError};
use tonic::metadata::MetadataMap;

use super::authenticate;
use crate::context::Context;
use crate::svc::{ListEnrollmentsInput, ListEnrollmentsOutput};

/// The caller's enrollments, oldest first.
pub(crate) async fn list_enrollments(
    ctx: &Context,
    metadata: &MetadataMap,
    _: &ListEnrollmentsInput,
) -> Result<ListEnrollmentsOutput, EndpointError<Infallible>> {
    let identity = authenticate(ctx, metadata)?;

    let enrollments = ctx
        .enrollments
        .enrollments(&identity)
        .await
        .map_err(simple_err_map!("List enrollments failed.", EndpointError::internal()))?;

    Ok(ListEnrollmentsOutput {
        enrollments: enrollments.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::create_course::{create_course, tests::input};
    use crate::operations::enroll::enroll;
    use crate::operations::test_support::{context, user};
    use crate::svc::EnrollInput;

    #[tokio::test]
    async fn lists_only_the_callers_enrollments() {
        let ctx = context();
        let (_, instructor) = user("radia");
        let (_, alice) = user("alice");
        let (_, bob) = user("bob");
        for title in ["Routing", "Switching"] {
            let created = create_course(&ctx, &instructor, &input(title, 5)).await.unwrap();
            enroll(
                &ctx,
                &alice,
                &EnrollInput {
                    course_id: created.course_id,
                },
            )
            .await
            .unwrap();
        }

        let mine = list_enrollments(&ctx, &alice, &ListEnrollmentsInput {}).await.unwrap();
        let theirs = list_enrollments(&ctx, &bob, &ListEnrollmentsInput {}).await.unwrap();

        let titles: Vec<&str> = mine.enrollments.iter().map(|e| e.course_title.as_str()).collect();
        assert_eq!(titles, vec!["Routing", "Switching"]);
        assert!(theirs.enrollments.is_empty());
    }
}
