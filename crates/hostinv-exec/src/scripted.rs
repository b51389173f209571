//! Canned-output command runner
//!
//! Replays fixed outputs for known commands. Anything not registered behaves
//! like a missing binary. Every invocation is recorded so callers can check
//! which commands a collector actually issued.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Command runner backed by a table of fixture outputs
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Result<CommandResult, ExecError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    /// Create a runner where every command is missing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a successful command with the given stdout
    #[must_use]
    pub fn with_output(self, cmd: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.with_result(cmd, CommandResult::new(0, stdout, ""))
    }

    /// Register a full command result (status, stdout, stderr)
    #[must_use]
    pub fn with_result(mut self, cmd: impl Into<String>, result: CommandResult) -> Self {
        self.responses.insert(cmd.into(), Ok(result));
        self
    }

    /// Register a command that fails to run
    #[must_use]
    pub fn with_error(mut self, cmd: impl Into<String>, error: ExecError) -> Self {
        self.responses.insert(cmd.into(), Err(error));
        self
    }

    /// Register a binary as present for `which` probes
    #[must_use]
    pub fn with_binary(self, binary: &str) -> Self {
        self.with_output(format!("which {binary}"), format!("/usr/bin/{binary}"))
    }

    /// Commands issued so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn respond(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cmd.to_string());
        }

        match self.responses.get(cmd) {
            Some(response) => response.clone(),
            None => Err(ExecError::NotFound(cmd.to_string())),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.respond(cmd)
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        _timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.respond(cmd)
    }

    fn runner_type(&self) -> &'static str {
        "scripted"
    }
}
