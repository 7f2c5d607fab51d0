use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A node, payload buffer or the container itself could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
    /// The operation needs at least one element.
    #[error("queue is empty")]
    Empty,
    /// A required argument was absent or malformed. Names the argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

pub type Result<T> = std::result::Result<T, Error>;
