//! Command runner trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Capability to run a shell command on the local machine
///
/// A non-zero exit status is reported through [`CommandResult::status`], not as
/// an error. Errors are reserved for commands that could not be run to
/// completion at all (spawn failure, I/O failure, timeout).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command without a time limit
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError>;

    /// Run a command, giving up once `timeout` has elapsed
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Short name used in logs
    fn runner_type(&self) -> &'static str;
}
