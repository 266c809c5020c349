//! Error types for the kobo-reader-rust library.
//!
//! Storage and load failures have dedicated variants so callers can tell a
//! missing database apart from a broken one. A volume that matches no content
//! row is not an error and never appears here.

use thiserror::Error;

/// Errors that can occur in the kobo-reader-rust library.
#[derive(Error, Debug)]
pub enum KoboError {
    /// No database is loaded, or a pinned reader outlived a clear/reload
    #[error("Storage unavailable: no database is currently loaded")]
    StorageUnavailable,

    /// Uploaded bytes are not a SQLite database or lack the Kobo tables
    #[error("Malformed database: {0}")]
    MalformedDatabase(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid user input (paths, formats)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Binary serialization errors
    #[error("Binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Persistence backend errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// A blocking load task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience type alias for Result with KoboError
pub type Result<T> = std::result::Result<T, KoboError>;

impl From<sled::Error> for KoboError {
    fn from(err: sled::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for KoboError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(err.into_error())
    }
}
