//! Common error types for Wortschatz

use thiserror::Error;

/// Common result type for Wortschatz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Wortschatz crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, malformed or expired credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity lacking the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate unique key (email, user+word, user+badge)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
