//! Error types for phototag.
//!
//! Index-level "not found" conditions are absorbed as no-ops by the
//! [`BidirectionalIndex`](crate::index::BidirectionalIndex); only the conditions
//! listed here ever reach a caller.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which history stack an undo/redo request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryDirection::Undo => write!(f, "undo"),
            HistoryDirection::Redo => write!(f, "redo"),
        }
    }
}

/// Main error type for the phototag core.
#[derive(Debug, Error)]
pub enum PhotoTagError {
    // Validation errors
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    // Lookup errors
    #[error("Picture not found: {0}")]
    PictureNotFound(String),

    #[error("Tag not found: @{0}")]
    TagNotFound(String),

    #[error("Tag already exists: @{0}")]
    TagExists(String),

    // History errors
    #[error("Nothing to {0}")]
    EmptyHistory(HistoryDirection),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File already exists: {0}")]
    FileAlreadyExists(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for phototag operations.
pub type Result<T> = std::result::Result<T, PhotoTagError>;

impl From<std::io::Error> for PhotoTagError {
    fn from(err: std::io::Error) -> Self {
        PhotoTagError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for PhotoTagError {
    fn from(err: serde_json::Error) -> Self {
        PhotoTagError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl PhotoTagError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        PhotoTagError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PhotoTagError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by the request rather than the environment.
    ///
    /// Front-ends report these and carry on; anything else (I/O, JSON, config)
    /// is an environmental failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PhotoTagError::Validation { .. }
                | PhotoTagError::PictureNotFound(_)
                | PhotoTagError::TagNotFound(_)
                | PhotoTagError::TagExists(_)
                | PhotoTagError::EmptyHistory(_)
                | PhotoTagError::FileAlreadyExists(_)
                | PhotoTagError::NotADirectory(_)
        )
    }
}
