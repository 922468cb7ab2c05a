pub mod auth;
pub mod ddb;
pub mod endpoint_error;
pub mod operation_error;
pub mod telemetry;

pub use endpoint_error::EndpointError;
pub use operation_error::OperationError;
