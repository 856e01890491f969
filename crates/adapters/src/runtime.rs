// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime driven through the docker or podman CLI.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use baton_core::RuntimeKind;
use baton_process::{execute, CommandError, CommandOptions, DEFAULT_TIMEOUT};
use thiserror::Error;

/// `<state>|<health>`; health is empty for images without a health probe.
const STATUS_FORMAT: &str = "{{.State.Status}}|{{if .State.Health}}{{.State.Health.Status}}{{end}}";

/// Seconds a container gets to exit after SIGTERM before the runtime kills it.
const STOP_GRACE_SECS: &str = "10";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{0} run printed no container id")]
    MissingContainerId(&'static str),
}

/// Everything needed to start one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub runtime: RuntimeKind,
    pub name: String,
    pub image: String,
    /// Host address the published port binds to.
    pub host: String,
    pub host_port: u16,
    pub internal_port: u16,
    pub env: BTreeMap<String, String>,
    /// Extra `--key=value` flags passed to `run`.
    pub options: BTreeMap<String, String>,
}

impl ContainerSpec {
    /// Arguments for `<binary> run`.
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "-p".to_string(),
            format!("{}:{}:{}", self.host, self.host_port, self.internal_port),
        ];
        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        for (key, value) in &self.options {
            args.push(format!("--{}={}", key, value));
        }
        args.push(self.image.clone());
        args
    }
}

/// Observed container state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    /// e.g. `created`, `running`, `exited`.
    pub state: String,
    /// Health probe status, absent when the image defines no probe.
    pub health: Option<String>,
}

impl ContainerStatus {
    pub fn running() -> Self {
        Self { state: "running".to_string(), health: None }
    }

    /// Parse `inspect` output in [`STATUS_FORMAT`].
    pub fn parse(output: &str) -> Self {
        let line = output.trim();
        let (state, health) = line.split_once('|').unwrap_or((line, ""));
        Self {
            state: state.trim().to_string(),
            health: Some(health.trim()).filter(|h| !h.is_empty()).map(str::to_string),
        }
    }

    /// Running, and either without a health probe or reporting healthy.
    pub fn is_healthy(&self) -> bool {
        self.state == "running" && !matches!(self.health.as_deref(), Some(h) if h != "healthy")
    }
}

/// Starts, stops, removes, and inspects containers.
#[async_trait]
pub trait ContainerRuntime: Clone + Send + Sync + 'static {
    /// Start a container, returning its id.
    async fn start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    async fn stop(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError>;

    /// Force-remove a container, running or not.
    async fn remove(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError>;

    async fn status(&self, runtime: RuntimeKind, name: &str) -> Result<ContainerStatus, RuntimeError>;
}

/// Container runtime backed by the docker or podman CLI.
#[derive(Debug, Clone)]
pub struct CliRuntime {
    timeout: Duration,
    search_path: Option<String>,
}

impl Default for CliRuntime {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, search_path: None }
    }
}

impl CliRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout for each CLI invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the CLI binary from this `PATH` instead of the agent's own.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    async fn run(&self, runtime: RuntimeKind, args: &[String]) -> Result<String, RuntimeError> {
        let mut options = CommandOptions::new().timeout(self.timeout);
        if let Some(path) = &self.search_path {
            options = options.env("PATH", path);
        }
        Ok(execute(runtime.binary(), args, options).await.into_output()?)
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let output = self.run(spec.runtime, &spec.run_args()).await?;
        // `run -d` prints pull progress first when the image is not local
        let id = output.lines().map(str::trim).rfind(|l| !l.is_empty()).unwrap_or_default();
        if id.is_empty() {
            return Err(RuntimeError::MissingContainerId(spec.runtime.binary()));
        }
        tracing::info!(
            container = %spec.name,
            id = baton_core::short(id, 12),
            port = spec.host_port,
            "container started"
        );
        Ok(id.to_string())
    }

    async fn stop(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError> {
        self.run(runtime, &args(&["stop", "-t", STOP_GRACE_SECS, name])).await?;
        tracing::info!(container = %name, "container stopped");
        Ok(())
    }

    async fn remove(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError> {
        self.run(runtime, &args(&["rm", "-f", name])).await?;
        tracing::info!(container = %name, "container removed");
        Ok(())
    }

    async fn status(&self, runtime: RuntimeKind, name: &str) -> Result<ContainerStatus, RuntimeError> {
        let output = self.run(runtime, &args(&["inspect", "--format", STATUS_FORMAT, name])).await?;
        Ok(ContainerStatus::parse(&output))
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
