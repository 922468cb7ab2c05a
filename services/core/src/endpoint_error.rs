use std::error::Error;
use std::fmt::Display;

use strum::AsRefStr;
use tonic::{Code, Status};

use crate::operation_error::OperationError;

/// Outcome of a failed operation, as seen by the caller.
///
/// Expected, user-facing failures travel as `Operation(E)` and keep their specific gRPC code. Datastore and
/// other unexpected failures are logged where they happen and collapse into `Internal`, so no backend detail
/// leaks to the client.
#[derive(Debug, AsRefStr)]
pub enum EndpointError<E: OperationError> {
    Validation(String),
    Unauthenticated,
    Internal,
    Operation(E),
}

impl<E: OperationError> EndpointError<E> {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal() -> Self {
        Self::Internal
    }

    pub fn operation(err: E) -> Self {
        Self::Operation(err)
    }
}

impl<E: OperationError> OperationError for EndpointError<E> {
    fn code(&self) -> Code {
        match self {
            EndpointError::Validation(_) => Code::InvalidArgument,
            EndpointError::Unauthenticated => Code::Unauthenticated,
            EndpointError::Internal => Code::Internal,
            EndpointError::Operation(e) => e.code(),
        }
    }
}

impl<E: OperationError> Error for EndpointError<E> {}

impl<E: OperationError> Display for EndpointError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind: &str = self.as_ref();
        let msg = match self {
            EndpointError::Validation(msg) => msg.clone(),
            EndpointError::Unauthenticated => String::from("A valid access token is required."),
            EndpointError::Internal => String::from("Internal server error."),
            EndpointError::Operation(err) => err.to_string(),
        };

        write!(f, "{}: {}", kind, msg)
    }
}

impl<E: OperationError> From<EndpointError<E>> for Status {
    fn from(err: EndpointError<E>) -> Self {
        Status::new(err.code(), err.to_string())
    }
}
