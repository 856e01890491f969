// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation options.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::event::{InvocationId, ProgressEvent};

/// Timeout applied when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Receiver side of progress notifications.
pub type Subscriber = mpsc::UnboundedSender<ProgressEvent>;

#[derive(Debug, Clone)]
pub struct CommandOptions {
    /// `None` means the command may run forever.
    pub timeout: Option<Duration>,
    pub cwd: Option<PathBuf>,
    /// Overrides merged on top of the agent's own environment.
    pub env: Vec<(String, String)>,
    pub subscriber: Option<Subscriber>,
    pub invocation: InvocationId,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            cwd: None,
            env: Vec::new(),
            subscriber: None,
            invocation: InvocationId::new(),
        }
    }
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn subscriber(mut self, subscriber: Subscriber) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    pub fn invocation(mut self, invocation: InvocationId) -> Self {
        self.invocation = invocation;
        self
    }

    /// Last `PATH` override, if the caller set one.
    pub(crate) fn path_override(&self) -> Option<&str> {
        self.env.iter().rev().find(|(k, _)| k == "PATH").map(|(_, v)| v.as_str())
    }

    pub(crate) fn notify(&self, event: ProgressEvent) {
        if let Some(subscriber) = &self.subscriber {
            // A subscriber that went away must not affect the command.
            let _ = subscriber.send(event);
        }
    }
}
