//! Error types for hostinv-pkg

use thiserror::Error;

/// Errors that can occur while listing packages
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Package manager not found on system
    #[error("package manager not found: {0}")]
    ManagerNotFound(String),

    /// Command ran but did not produce a listing
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output
    #[error("parse error: {0}")]
    ParseError(String),
}
