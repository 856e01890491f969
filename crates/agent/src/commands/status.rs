// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use anyhow::Result;
use baton_adapters::StateStore;
use baton_core::{AppRecord, Clock, SystemClock};
use clap::Args;

use crate::exit_error::{ExitError, EXIT_FAILED};
use crate::output::{format_time_ago, OutputFormat};
use crate::setup;

#[derive(Args)]
pub struct StatusArgs {
    /// Application to show (default: all)
    pub app_id: Option<String>,
    #[arg(long = "output", short = 'o', value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub async fn handle(args: StatusArgs) -> Result<()> {
    let store = setup::state_store()?;

    let records = match &args.app_id {
        Some(app_id) => match store.get(app_id).await? {
            Some(record) => vec![record],
            None => {
                return Err(
                    ExitError::new(EXIT_FAILED, format!("no deployment recorded for {}", app_id))
                        .into(),
                )
            }
        },
        None => store.list().await?,
    };

    match args.format {
        OutputFormat::Json if args.app_id.is_some() => {
            println!("{}", serde_json::to_string_pretty(&records[0])?);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No applications deployed");
            }
            let now_ms = SystemClock.epoch_ms();
            for record in &records {
                println!("{}", format_record(record, now_ms));
            }
        }
    }
    Ok(())
}

pub(crate) fn format_record(record: &AppRecord, now_ms: u64) -> String {
    let domains =
        if record.domains.is_empty() { "-".to_string() } else { record.domains.join(",") };
    format!(
        "{}  {}  port={}  container={}  domains={}  updated={}",
        record.app_id,
        record.status,
        record.port,
        record.container_name,
        domains,
        format_time_ago(record.updated_at_ms, now_ms),
    )
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
