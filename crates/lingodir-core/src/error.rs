//! Error types for lingodir.

use thiserror::Error;

/// Result type alias using lingodir's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lingodir operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists (user-visible duplicate)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store rejected a write because a uniqueness rule or a concurrent
    /// writer got there first. Services translate this into `Conflict`.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Turn a store-level uniqueness failure into the user-visible duplicate
    /// signal, leaving every other error untouched.
    pub fn into_conflict(self) -> Self {
        match self {
            Error::ConstraintViolation(msg) => Error::Conflict(msg),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
