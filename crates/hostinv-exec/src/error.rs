//! Error types for hostinv-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a command
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error (usually the binary or shell is missing)
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),

    /// No canned output registered for a command (scripted runner only)
    #[error("command not found: {0}")]
    NotFound(String),
}

impl ExecError {
    /// Whether the error means the backing tool is effectively absent
    ///
    /// Timeouts count as absence: a collector that timed out has no data.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ExecError::Timeout { .. } | ExecError::SpawnError(_) | ExecError::NotFound(_)
        )
    }
}
