//! Buffer errors
use thiserror::Error;

/// Result type: `std::result::Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the buffer and its configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The buffer could not be created, typically because of a capacity that is not positive.
    /// The buffer is never created when this is returned
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call blocked in `put` or `get` was told to stop waiting
    #[error("operation cancelled")]
    Cancelled,

    /// A bounded wait expired before the buffer had room or a value
    #[error("operation timed out")]
    Timeout,

    /// A call that never blocks found the buffer full
    #[error("buffer is full")]
    Full,
}

/// A rejected `put`. The value that could not be stored is handed back to the caller so nothing is dropped
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PutError<T> {
    /// The buffer was full and the call does not block
    #[error("buffer is full")]
    Full(T),

    /// The buffer stayed full until the deadline
    #[error("put timed out")]
    Timeout(T),

    /// The waiting call was cancelled
    #[error("put cancelled")]
    Cancelled(T),
}

impl<T> PutError<T> {
    /// Returns the value that was not stored
    pub fn into_inner(self) -> T {
        return match self {
            PutError::Full(value) | PutError::Timeout(value) | PutError::Cancelled(value) => value,
        };
    }

    /// Returns true if the call gave up because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        return matches!(self, PutError::Cancelled(_));
    }
}

// -----------------------------------------------------------------------------
// 		- Put error -
// -----------------------------------------------------------------------------
impl<T> From<PutError<T>> for Error {
    fn from(err: PutError<T>) -> Error {
        return match err {
            PutError::Full(_) => Error::Full,
            PutError::Timeout(_) => Error::Timeout,
            PutError::Cancelled(_) => Error::Cancelled,
        };
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        return Error::InvalidConfiguration(err.to_string());
    }
}
