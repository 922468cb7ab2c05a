pub mod ddb_repository;
pub mod memory_repository;
pub mod repository;
pub mod service;
pub mod types;

pub use ddb_repository::DdbEnrollmentStore;
pub use memory_repository::InMemoryEnrollments;
pub use repository::{EnrollmentStore, EnrollmentStoreError};
pub use service::{Enrolled, EnrollmentError, EnrollmentService, EnrollmentStatus, DEFAULT_MAX_ENROLLMENTS};
pub use types::Enrollment;
