//! Error types for cfgmig.

use thiserror::Error;

/// Result type alias using cfgmig's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cfgmig operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or blank run configuration (origin, destination, credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Origin component has no registered migration
    #[error("Unsupported origin: {0}")]
    UnsupportedOrigin(String),

    /// Failure that is reported to the operator as-is
    #[error("{0}")]
    User(String),

    /// Invalid input passed to a store call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage API answered with a non-success status
    #[error("Storage API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error describes an operator-side problem that should be
    /// surfaced without wrapping.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::UnsupportedOrigin(_) | Error::User(_) | Error::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
