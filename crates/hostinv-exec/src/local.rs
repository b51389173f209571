//! Local command execution using `tokio::process`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Local command runner
///
/// Executes commands through `sh -c` on the machine being inventoried.
#[derive(Debug, Clone)]
pub struct LocalRunner;

impl LocalRunner {
    /// Create a new local runner
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Internal method to execute command
    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(command = %cmd, "executing local command");

        // Use shell to support pipes, redirections, etc.
        // The child is killed if the timeout drops this future.
        let child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            command = %cmd,
            status = status,
            duration = ?duration,
            "command completed"
        );

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    #[instrument(skip(self), level = "debug")]
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.execute(cmd).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        match timeout(timeout_duration, self.execute(cmd)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    command = %cmd,
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command timed out"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn runner_type(&self) -> &'static str {
        "local"
    }
}
