//! Error types for sr-core

use thiserror::Error;

/// Core error type for sqlrun
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Scripts root directory not found
    #[error("[E001] Scripts directory not found: {path}")]
    RootNotFound { path: String },

    /// E002: Failed to parse the relations manifest
    #[error("[E002] Failed to parse relations manifest {path}: {message}")]
    RelationsParseError { path: String, message: String },

    /// E003: Circular dependency in the relations manifest
    #[error("[E003] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E004: Empty script name
    #[error("[E004] Empty script name in {context}")]
    EmptyName { context: String },

    /// E005: Malformed storage path
    #[error("[E005] Invalid storage path '{path}': expected gs://<bucket>/<object>")]
    InvalidStoragePath { path: String },

    /// E006: gzip encode/decode failure
    #[error("[E006] Compression error: {0}")]
    Compression(std::io::Error),

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
