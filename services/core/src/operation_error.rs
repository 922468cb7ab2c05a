use std::error::Error;
use std::fmt::{Display, Formatter};

use tonic::Code;

/// Trait to be implemented by errors returned by the different operations of the service.
pub trait OperationError: Error {
    /// gRPC code corresponding to this error.
    fn code(&self) -> Code;
}

/// Error type for operations whose only failure modes are validation and internal errors.
#[derive(Debug)]
pub enum Infallible {}

impl Display for Infallible {
    fn fmt(&self, _: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {}
    }
}

impl Error for Infallible {}

impl OperationError for Infallible {
    fn code(&self) -> Code {
        match *self {}
    }
}
