//! Response status of a service call, independent of any transport.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    /// HTTP-equivalent status code.
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalError => 500,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::NoContent => "No Content",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalError => "Internal Error",
        };
        write!(f, "{} {}", self.code(), reason)
    }
}

/// A successful response: its status plus the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    pub status: Status,
    pub body: T,
}

impl<T> Response<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status: Status::Created,
            body,
        }
    }
}

impl Response<()> {
    pub fn no_content() -> Self {
        Self {
            status: Status::NoContent,
            body: (),
        }
    }
}
