pub mod aggregator;
pub mod ddb_repository;
pub mod memory_repository;
pub mod repository;
pub mod types;

pub use aggregator::{average, ReviewAggregator, ReviewError};
pub use ddb_repository::DdbReviewRepository;
pub use memory_repository::InMemoryReviews;
pub use repository::{ReviewRepository, ReviewRepositoryError};
pub use types::Review;
