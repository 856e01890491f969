// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of one command invocation.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::event::InvocationId;

/// Longest slice of output quoted in a [`CommandError`] message.
const ERROR_OUTPUT_LIMIT: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NonZeroExit,
    Timeout,
    ExecutableNotFound,
    /// The event loop died before a terminal event; only produced by
    /// supervisory wrappers and spawn failures.
    RuntimeCrash,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NonZeroExit => "non-zero-exit",
            FailureReason::Timeout => "timeout",
            FailureReason::ExecutableNotFound => "executable-not-found",
            FailureReason::RuntimeCrash => "runtime-crash",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produced exactly once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub invocation: InvocationId,
    pub command: String,
    pub status: CommandStatus,
    pub exit_code: Option<i32>,
    /// Ordered concatenation of every delivered output fragment.
    pub output: String,
    pub reason: Option<FailureReason>,
    pub elapsed: Duration,
}

impl CommandResult {
    pub(crate) fn success(
        invocation: InvocationId,
        command: &str,
        output: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            invocation,
            command: command.to_string(),
            status: CommandStatus::Ok,
            exit_code: Some(0),
            output,
            reason: None,
            elapsed,
        }
    }

    pub(crate) fn failure(
        invocation: InvocationId,
        command: &str,
        reason: FailureReason,
        exit_code: Option<i32>,
        output: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            invocation,
            command: command.to_string(),
            status: CommandStatus::Error,
            exit_code,
            output,
            reason: Some(reason),
            elapsed,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CommandStatus::Ok
    }

    /// Output on success, a [`CommandError`] otherwise.
    pub fn into_output(self) -> Result<String, CommandError> {
        let reason = match self.reason {
            None if self.is_ok() => return Ok(self.output),
            None => FailureReason::RuntimeCrash,
            Some(reason) => reason,
        };
        let output = tail(self.output.trim(), ERROR_OUTPUT_LIMIT).to_string();
        let command = self.command;
        Err(match reason {
            FailureReason::NonZeroExit => {
                CommandError::NonZeroExit { command, exit_code: self.exit_code, output }
            }
            FailureReason::Timeout => {
                CommandError::Timeout { command, elapsed: self.elapsed, output }
            }
            FailureReason::ExecutableNotFound => CommandError::NotFound { command },
            FailureReason::RuntimeCrash => CommandError::RuntimeCrash { command, output },
        })
    }
}

/// Command-level error taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("`{command}` exited with code {}: {output}", exit_code_text(.exit_code))]
    NonZeroExit { command: String, exit_code: Option<i32>, output: String },
    #[error("`{command}` timed out after {}ms", .elapsed.as_millis())]
    Timeout { command: String, elapsed: Duration, output: String },
    #[error("executable `{command}` not found")]
    NotFound { command: String },
    #[error("process runtime crashed while running `{command}`")]
    RuntimeCrash { command: String, output: String },
}

impl CommandError {
    pub fn reason(&self) -> FailureReason {
        match self {
            CommandError::NonZeroExit { .. } => FailureReason::NonZeroExit,
            CommandError::Timeout { .. } => FailureReason::Timeout,
            CommandError::NotFound { .. } => FailureReason::ExecutableNotFound,
            CommandError::RuntimeCrash { .. } => FailureReason::RuntimeCrash,
        }
    }
}

fn exit_code_text(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string())
}

fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
