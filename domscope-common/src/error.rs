//! Common error types for domscope

use thiserror::Error;

/// Common result type for domscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the domscope crates
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

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (serialization, corrupt rows, worker failures)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error is a UNIQUE constraint violation reported by SQLite
    #[cfg(feature = "sqlx")]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
