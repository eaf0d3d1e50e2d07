use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems that make an analysis impossible.
///
/// Everything else (unreadable files, unparsable source, unresolved
/// specifiers) is skipped where it happens and never surfaces as an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Root directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid settings file {}: {reason}", .path.display())]
    InvalidSettings { path: PathBuf, reason: String },
}
