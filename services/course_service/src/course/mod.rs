pub mod ddb_repository;
pub mod memory_repository;
pub mod repository;
pub mod types;

pub use ddb_repository::DdbCourseCatalog;
pub use memory_repository::InMemoryCourses;
pub use repository::{CatalogError, CourseCatalog};
pub use types::{Course, CourseAttributes};
