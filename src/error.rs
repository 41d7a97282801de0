//! Error types for the pipeline runner.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum SparError {
    /// Invalid run configuration, detected before any external process starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An output directory could not be created. Logged and tolerated at the
    /// call sites that predate the first external invocation.
    #[error("could not create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pipeline stage failed to spawn or exited with a failure status.
    #[error("{stage} stage failed: {reason}")]
    ExternalProcess { stage: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SparError>;
