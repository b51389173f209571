//! Fault-tolerant command probing
//!
//! Collectors must never fail the run. `Probe` applies the per-command timeout
//! and folds every failure mode (missing binary, non-zero exit, timeout) into
//! `None`, logging the reason.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Default per-command timeout
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded, best-effort access to external commands
#[derive(Clone)]
pub struct Probe {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("runner", &self.runner.runner_type())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Probe {
    /// Create a probe with the default 30 second timeout
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Set the per-command timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a command, returning the raw result if it ran to completion
    pub async fn run(&self, cmd: &str) -> Option<CommandResult> {
        match self.runner.run_with_timeout(cmd, self.timeout).await {
            Ok(result) => Some(result),
            Err(e) if e.is_unavailable() => {
                debug!(command = %cmd, error = %e, "command unavailable");
                None
            }
            Err(e) => {
                warn!(command = %cmd, error = %e, "command failed to run");
                None
            }
        }
    }

    /// Trimmed stdout of a command that exited zero and printed something
    pub async fn stdout(&self, cmd: &str) -> Option<String> {
        let result = self.run(cmd).await?;
        if !result.success() {
            debug!(command = %cmd, status = result.status, "command exited non-zero");
            return None;
        }
        non_empty(result.stdout.trim())
    }

    /// Trimmed stdout regardless of exit status
    ///
    /// `npm list` and `pip list` exit non-zero on dependency warnings while
    /// still printing a usable listing.
    pub async fn stdout_lenient(&self, cmd: &str) -> Option<String> {
        let result = self.run(cmd).await?;
        non_empty(result.stdout.trim())
    }

    /// Version banner of a tool
    ///
    /// Uses stdout, or stderr when stdout is blank and the command succeeded.
    /// A failed command only contributes stdout, so a shell "not found"
    /// message on stderr is never mistaken for a banner.
    pub async fn banner(&self, cmd: &str) -> Option<String> {
        let result = self.run(cmd).await?;
        if result.success() {
            non_empty(result.banner())
        } else {
            non_empty(result.stdout.trim())
        }
    }

    /// Whether a binary is on `PATH`
    pub async fn has_binary(&self, binary: &str) -> bool {
        self.stdout(&format!("which {binary}")).await.is_some()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
