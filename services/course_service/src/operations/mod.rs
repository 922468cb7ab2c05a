pub mod create_course;
pub mod delete_course;
pub mod describe_course;
pub mod describe_enrollment;
pub mod enroll;
pub mod list_courses;
pub mod list_courses_for_instructor;
pub mod list_enrollments;
pub mod list_reviews;
pub mod submit_review;
pub mod unenroll;
pub mod update_course;

use course_service_core::auth::Identity;
use course_service_core::{EndpointError, OperationError};
use tonic::metadata::MetadataMap;
use uuid::Uuid;

use crate::context::Context;

/// Resolves the caller, rejecting the request as unauthenticated if there is no valid access token.
pub(crate) fn authenticate<E: OperationError>(ctx: &Context, metadata: &MetadataMap) -> Result<Identity, EndpointError<E>> {
    ctx.identity(metadata).map_err(|e| {
        tracing::info!(error = %e, "Rejected request without a valid access token.");
        EndpointError::Unauthenticated
    })
}

pub(crate) fn parse_id<E: OperationError>(value: &str, what: &str) -> Result<Uuid, EndpointError<E>> {
    Uuid::parse_str(value.trim()).map_err(|_| EndpointError::validation(format!("Invalid {} ID provided.", what)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use course_service_core::auth::{Claims, Identity, TokenVerifier};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tonic::metadata::MetadataMap;
    use uuid::Uuid;

    use crate::context::Context;
    use crate::enrollment::DEFAULT_MAX_ENROLLMENTS;

    const SECRET: &[u8] = b"operations-test-secret";

    pub(crate) fn context() -> Context {
        Context::in_memory(TokenVerifier::new(SECRET), DEFAULT_MAX_ENROLLMENTS)
    }

    /// A signed-in user: its identity and the request metadata carrying its access token.
    pub(crate) fn user(name: &str) -> (Identity, MetadataMap) {
        let identity = Identity::new(Uuid::new_v4(), format!("{}@example.com", name), name);
        let claims = Claims {
            sub: identity.user_id().to_string(),
            email: identity.email().to_owned(),
            name: identity.display_name().to_owned(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        let mut metadata = MetadataMap::new();
        metadata.insert("authorization", format!("Bearer {}", token).parse().unwrap());
        (identity, metadata)
    }

    pub(crate) fn anonymous() -> MetadataMap {
        MetadataMap::new()
    }
}
