// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source retrieval through `git`.

use std::path::Path;
use std::time::Duration;

use baton_process::{execute, CommandError, CommandOptions, Subscriber};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("destination {0} already exists")]
    DestinationExists(String),
    #[error("git clone failed: {0}")]
    Clone(#[from] CommandError),
}

/// Shallow-clones repositories with the `git` CLI.
#[derive(Debug, Clone, Default)]
pub struct GitFetcher {
    timeout: Option<Duration>,
    search_path: Option<String>,
    subscriber: Option<Subscriber>,
}

impl GitFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve `git` from this `PATH` instead of the agent's own.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Receive clone progress as it is produced.
    pub fn with_subscriber(mut self, subscriber: Subscriber) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// `git clone --depth 1 [--branch <branch>] <repo> <dest>`.
    pub async fn fetch(&self, repo: &str, branch: Option<&str>, dest: &Path) -> Result<(), FetchError> {
        if dest.exists() {
            return Err(FetchError::DestinationExists(dest.display().to_string()));
        }

        let mut args = vec!["clone".to_string(), "--depth".to_string(), "1".to_string()];
        if let Some(branch) = branch {
            args.push("--branch".to_string());
            args.push(branch.to_string());
        }
        args.push(repo.to_string());
        args.push(dest.display().to_string());

        let mut options = CommandOptions::new();
        if let Some(timeout) = self.timeout {
            options = options.timeout(timeout);
        }
        if let Some(path) = &self.search_path {
            options = options.env("PATH", path);
        }
        if let Some(subscriber) = &self.subscriber {
            options = options.subscriber(subscriber.clone());
        }
        // Never block on a credential prompt
        options = options.env("GIT_TERMINAL_PROMPT", "0");

        execute("git", &args, options).await.into_output()?;
        tracing::info!(%repo, branch = branch.unwrap_or("HEAD"), dest = %dest.display(), "source fetched");
        Ok(())
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
