use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use course_service_core::auth::{AuthError, Identity, TokenVerifier};
use course_service_core::ddb::adapter::AdapterError;
use course_service_core::ddb::Adapter;
use thiserror::Error;
use tonic::metadata::MetadataMap;

use crate::course::{CourseCatalog, DdbCourseCatalog, InMemoryCourses};
use crate::enrollment::{DdbEnrollmentStore, EnrollmentService, InMemoryEnrollments, DEFAULT_MAX_ENROLLMENTS};
use crate::review::{DdbReviewRepository, InMemoryReviews, ReviewAggregator};
use crate::seat_ledger::DdbSeatLedger;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    StorageBackend,
    DynamoDbEndpoint,
    CoursesTableName,
    CourseEnrollmentsTableName,
    CourseReviewsTableName,
    JwtSecret,
    MaxEnrollments,
    ListenAddr,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::StorageBackend => write!(f, "STORAGE_BACKEND"),
            Self::DynamoDbEndpoint => write!(f, "DYNAMODB_ENDPOINT"),
            Self::CoursesTableName => write!(f, "COURSES_TABLE_NAME"),
            Self::CourseEnrollmentsTableName => write!(f, "COURSE_ENROLLMENTS_TABLE_NAME"),
            Self::CourseReviewsTableName => write!(f, "COURSE_REVIEWS_TABLE_NAME"),
            Self::JwtSecret => write!(f, "JWT_SECRET"),
            Self::MaxEnrollments => write!(f, "MAX_ENROLLMENTS"),
            Self::ListenAddr => write!(f, "LISTEN_ADDR"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Environment variable {0} is not set.")]
    Missing(ContextKey),

    #[error("Environment variable {key} is invalid: {reason}")]
    Invalid { key: ContextKey, reason: String },

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend {:?}, expected \"dynamodb\" or \"memory\"", other)),
        }
    }
}

/// Everything an operation needs, assembled once at startup.
#[derive(Clone)]
pub struct Context {
    pub catalog: Arc<dyn CourseCatalog>,
    pub enrollments: EnrollmentService,
    pub reviews: ReviewAggregator,
    pub token_verifier: TokenVerifier,
    pub listen_addr: SocketAddr,
}

impl Context {
    pub async fn from_env() -> Result<Self, ContextError> {
        Self::from_lookup(|key| env::var(key.to_string()).ok()).await
    }

    /// Builds the context from a variable lookup, `from_env` being the lookup into the process environment.
    pub async fn from_lookup(lookup: impl Fn(ContextKey) -> Option<String>) -> Result<Self, ContextError> {
        let required = |key| lookup(key).ok_or(ContextError::Missing(key));

        let token_verifier = TokenVerifier::new(required(ContextKey::JwtSecret)?.as_bytes());
        let max_enrollments = match lookup(ContextKey::MaxEnrollments) {
            Some(value) => parse_max_enrollments(&value)?,
            None => DEFAULT_MAX_ENROLLMENTS,
        };
        let listen_addr = lookup(ContextKey::ListenAddr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned())
            .parse()
            .map_err(|e: std::net::AddrParseError| ContextError::Invalid {
                key: ContextKey::ListenAddr,
                reason: e.to_string(),
            })?;
        let backend = match lookup(ContextKey::StorageBackend) {
            Some(value) => value.parse().map_err(|reason| ContextError::Invalid {
                key: ContextKey::StorageBackend,
                reason,
            })?,
            None => StorageBackend::DynamoDb,
        };

        let mut ctx = match backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown.");
                Self::in_memory(token_verifier, max_enrollments)
            }
            StorageBackend::DynamoDb => {
                let courses_table_name = required(ContextKey::CoursesTableName)?;
                let enrollments_table_name = required(ContextKey::CourseEnrollmentsTableName)?;
                let reviews_table_name = required(ContextKey::CourseReviewsTableName)?;
                let endpoint = lookup(ContextKey::DynamoDbEndpoint);
                let adapter = Adapter::from_env(endpoint.as_deref()).await?;

                Context {
                    catalog: Arc::new(DdbCourseCatalog::new(adapter.clone(), courses_table_name.as_str())),
                    enrollments: EnrollmentService::new(
                        Arc::new(DdbSeatLedger::new(adapter.clone(), courses_table_name)),
                        Arc::new(DdbEnrollmentStore::new(adapter.clone(), enrollments_table_name)),
                        max_enrollments,
                    ),
                    reviews: ReviewAggregator::new(Arc::new(DdbReviewRepository::new(adapter, reviews_table_name))),
                    token_verifier,
                    listen_addr,
                }
            }
        };

        ctx.listen_addr = listen_addr;
        tracing::info!(?backend, max_enrollments, %listen_addr, "Context ready.");
        Ok(ctx)
    }

    /// A context backed by in-process stores.
    pub fn in_memory(token_verifier: TokenVerifier, max_enrollments: usize) -> Self {
        let courses = InMemoryCourses::new();

        Context {
            catalog: Arc::new(courses.clone()),
            enrollments: EnrollmentService::new(
                Arc::new(courses),
                Arc::new(InMemoryEnrollments::new()),
                max_enrollments,
            ),
            reviews: ReviewAggregator::new(Arc::new(InMemoryReviews::new())),
            token_verifier,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }

    /// Resolves the caller from the `authorization` request metadata.
    pub fn identity(&self, metadata: &MetadataMap) -> Result<Identity, AuthError> {
        let header = match metadata.get("authorization") {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::Malformed)?),
            None => None,
        };
        self.token_verifier.verify_header(header)
    }
}

fn parse_max_enrollments(value: &str) -> Result<usize, ContextError> {
    let invalid = |reason: String| ContextError::Invalid {
        key: ContextKey::MaxEnrollments,
        reason,
    };
    match value.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be at least 1".to_owned())),
        Ok(max) => Ok(max),
        Err(e) => Err(invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    async fn context(vars: &[(ContextKey, &str)]) -> Result<Context, ContextError> {
        let vars: HashMap<ContextKey, String> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Context::from_lookup(|key| vars.get(&key).cloned()).await
    }

    #[tokio::test]
    async fn memory_backend_with_defaults() {
        let ctx = context(&[(ContextKey::StorageBackend, "memory"), (ContextKey::JwtSecret, "s3cret")])
            .await
            .unwrap();

        assert_eq!(ctx.enrollments.max_enrollments(), DEFAULT_MAX_ENROLLMENTS);
        assert_eq!(ctx.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn secret_is_required() {
        let err = context(&[(ContextKey::StorageBackend, "memory")]).await.err().unwrap();

        assert!(matches!(err, ContextError::Missing(ContextKey::JwtSecret)));
        assert_eq!(err.to_string(), "Environment variable JWT_SECRET is not set.");
    }

    #[tokio::test]
    async fn dynamodb_backend_requires_table_names() {
        let err = context(&[(ContextKey::JwtSecret, "s3cret")]).await.err().unwrap();

        assert!(matches!(err, ContextError::Missing(ContextKey::CoursesTableName)));
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let err = context(&[(ContextKey::StorageBackend, "postgres"), (ContextKey::JwtSecret, "s3cret")])
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ContextError::Invalid {
                key: ContextKey::StorageBackend,
                ..
            }
        ));
    }

    #[rstest]
    #[case("1", Some(1))]
    #[case(" 5 ", Some(5))]
    #[case("0", None)]
    #[case("-2", None)]
    #[case("three", None)]
    fn max_enrollments_must_be_positive(#[case] value: &str, #[case] expected: Option<usize>) {
        assert_eq!(parse_max_enrollments(value).ok(), expected);
    }
}
