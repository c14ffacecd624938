//! Error types for the bulk renamer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bulk renamer.
///
/// Only structural failures live here. Failures that affect a single file
/// are reported inside the run or undo result instead.
#[derive(Error, Debug)]
pub enum Error {
    // Rule errors
    #[error("Invalid rename rule: {0}")]
    Validation(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to create backup directory {path}: {source}")]
    BackupDirCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Undo errors
    #[error("No rename log found in {0}")]
    NoLogFound(String),

    #[error("Backup directory not found: {0}")]
    NoBackupFound(String),

    #[error("Rename log is corrupt: {path}: {source}")]
    LogCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error from a string.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
