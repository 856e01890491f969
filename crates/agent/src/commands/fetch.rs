// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fetch command handler

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use baton_adapters::GitFetcher;
use baton_process::ProgressEvent;
use clap::Args;
use tokio::sync::mpsc;

use crate::env;

#[derive(Args)]
pub struct FetchArgs {
    /// Repository URL or path
    pub repo: String,
    /// Destination directory (must not exist)
    pub dest: PathBuf,
    /// Branch or tag to check out
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

pub async fn handle(args: FetchArgs) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let fetcher = GitFetcher::new().with_timeout(env::command_timeout()).with_subscriber(tx);
    let printer = tokio::spawn(stream_progress(rx, std::io::stdout()));

    let result = fetcher.fetch(&args.repo, args.branch.as_deref(), &args.dest).await;
    // Last sender: lets the printer drain and stop
    drop(fetcher);
    if let Ok(Err(e)) = printer.await {
        tracing::debug!(error = %e, "progress output closed");
    }

    result?;
    println!("fetched {} into {}", args.repo, args.dest.display());
    Ok(())
}

/// Write each output line as it arrives. Returns the number of lines written.
pub(crate) async fn stream_progress(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    mut out: impl Write,
) -> std::io::Result<usize> {
    let mut lines = 0;
    while let Some(event) = rx.recv().await {
        if let ProgressEvent::Output { fragment, .. } = event {
            writeln!(out, "{}", fragment.text())?;
            out.flush()?;
            lines += 1;
        }
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
