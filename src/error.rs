//! Errors that end a run before a report can be produced.
//!
//! Per-file problems are never raised through this type; they are recorded as
//! scan errors or failed operations and reported at the end of the run.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JanitorError {
    /// The target does not exist or is not a directory.
    #[error("'{}' is not a valid directory", .path.display())]
    InvalidTargetDirectory { path: PathBuf },

    /// No directory was given and the current one could not be determined.
    #[error("Cannot determine the current directory: {0}")]
    CurrentDirectory(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write report to {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

/// Result type for whole-run operations.
pub type JanitorResult<T> = Result<T, JanitorError>;
