//! Result types for command execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Build a result from raw parts with zero duration
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Trimmed stdout, falling back to stderr when stdout is blank
    ///
    /// Several tools (`nginx -v`, `java -version`, `ssh -V`) print their
    /// version banner on stderr.
    #[must_use]
    pub fn banner(&self) -> &str {
        let stdout = self.stdout.trim();
        if stdout.is_empty() {
            self.stderr.trim()
        } else {
            stdout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_prefers_stdout() {
        let result = CommandResult::new(0, "git version 2.39.2\n", "noise");
        assert_eq!(result.banner(), "git version 2.39.2");
    }

    #[test]
    fn test_banner_falls_back_to_stderr() {
        let result = CommandResult::new(0, "  \n", "nginx version: nginx/1.18.0\n");
        assert_eq!(result.banner(), "nginx version: nginx/1.18.0");
    }
}
