//! Error types for sr-db

use std::time::Duration;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] unable to connect to database: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] unable to execute the sql on database: {0}")]
    ExecutionError(String),

    /// Transaction begin/commit/rollback error (D003)
    #[error("[D003] transaction {action} failed: {message}")]
    TransactionError {
        action: &'static str,
        message: String,
    },

    /// Operation exceeded the configured timeout (D004)
    #[error("[D004] database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Error raised by a transaction body (D005)
    #[error("[D005] {0}")]
    Body(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Wrap an arbitrary failure raised inside a transaction body
    pub fn body(err: impl std::fmt::Display) -> Self {
        DbError::Body(err.to_string())
    }
}
