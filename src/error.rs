//! Error types surfaced by the export and scaffold pipelines.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// The workspace root does not exist or is not a directory.
    #[error("No workspace folder open: '{0}' is not a directory")]
    NoWorkspace(PathBuf),

    /// `git ls-files` could not be run or reported failure.
    #[error("Git query failed in '{root}': {reason}")]
    VcsQuery { root: PathBuf, reason: String },

    /// A discovered file vanished or became unreadable before it was embedded.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid buffer manifest '{path}': {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// A scaffold build step exited non-zero or could not be started.
    #[error("Command `{command}` failed: {status}")]
    ExternalCommand { command: String, status: String },
}
