//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::status::Status;
use crate::domain::{DomainError, LineId, StationId};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("line not found: {0}")]
    LineNotFound(LineId),

    #[error("station not found: {0}")]
    UnknownStation(StationId),

    #[error("station {0} is still part of line {1}")]
    StationInUse(StationId, LineId),

    #[error("station name must not be empty")]
    EmptyName,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("storage failed: {context}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Response status this error maps to at the transport boundary.
    pub fn status(&self) -> Status {
        match self {
            ApplicationError::Domain(e) if e.is_rejection() => Status::BadRequest,
            ApplicationError::Domain(_) => Status::InternalError,
            ApplicationError::StationInUse(..) | ApplicationError::EmptyName => Status::BadRequest,
            ApplicationError::LineNotFound(_) | ApplicationError::UnknownStation(_) => {
                Status::NotFound
            }
            ApplicationError::Config { .. } | ApplicationError::Storage { .. } => {
                Status::InternalError
            }
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
