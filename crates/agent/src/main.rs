// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton: blue-green container deployment agent

mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod setup;

use clap::{Parser, Subcommand};

use commands::{deploy, fetch, status};

#[derive(Parser)]
#[command(
    name = "baton",
    about = "Blue-green container deployments behind a reverse proxy",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Roll out a deployment descriptor
    Deploy(deploy::DeployArgs),
    /// Show recorded application deployments
    Status(status::StatusArgs),
    /// Shallow-clone application source
    Fetch(fetch::FetchArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Deploy(args) => deploy::handle(args).await,
        Command::Status(args) => status::handle(args).await,
        Command::Fetch(args) => fetch::handle(args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let guard = logging::init(&env::log_filter(), env::log_file().as_deref());

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::debug!(error = %e, "command failed");
    }
    // Flush the log file before exiting
    drop(guard);

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_error::exit_code(&e));
    }
}
