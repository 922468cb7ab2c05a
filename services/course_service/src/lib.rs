pub mod context;
pub mod course;
pub mod enrollment;
pub mod operations;
pub mod review;
pub mod seat_ledger;
pub mod server;
pub mod svc;

#[cfg(test)]
pub(crate) mod ddb_errors;

pub use context::Context;
pub use server::CourseServiceImpl;
