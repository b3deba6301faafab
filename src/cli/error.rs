//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::{ApplicationError, Status};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Store { .. } => crate::exitcode::DATAERR,
                InfraError::Application(e) => match (e.status(), e) {
                    (Status::BadRequest, _) => crate::exitcode::DATAERR,
                    (Status::NotFound, _) => crate::exitcode::NOINPUT,
                    (_, ApplicationError::Config { .. }) => crate::exitcode::CONFIG,
                    (_, ApplicationError::Storage { .. }) => crate::exitcode::IOERR,
                    _ => crate::exitcode::SOFTWARE,
                },
            },
        }
    }

    /// Transport-level status, when the error came from a service call.
    pub fn status(&self) -> Option<Status> {
        match self {
            CliError::Infra(InfraError::Application(e)) => Some(e.status()),
            _ => None,
        }
    }
}
