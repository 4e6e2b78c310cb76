//! Error types for biji-core

use thiserror::Error;

/// Result type alias using biji-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in biji-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Note, account, or name lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// A note with the same trimmed name already exists
    #[error("Name is already taken: {0}")]
    NameConflict(String),

    /// Missing sync code
    #[error("Unauthorized: missing sync code")]
    Unauthorized,

    /// Every generated sync code collided with a registered one
    #[error("Failed to generate a unique sync code after {attempts} attempts")]
    RegistrationExhausted { attempts: u32 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input or wire payload
    #[error("Invalid input: {0}")]
    MalformedInput(String),

    /// Relay transport error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Whether this error is a read, write, or parse failure of a backing document
    pub const fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
