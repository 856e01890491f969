// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deploy command handler

use std::path::{Path, PathBuf};

use anyhow::Result;
use baton_core::Deployment;
use clap::Args;

use crate::exit_error::{ExitError, EXIT_FAILED};
use crate::setup;

#[derive(Args)]
pub struct DeployArgs {
    /// Deployment descriptor (JSON)
    pub descriptor: PathBuf,
}

pub async fn handle(args: DeployArgs) -> Result<()> {
    let deployment = read_descriptor(&args.descriptor)?;
    let deployer = setup::deployer().await?;

    match deployer.deploy(deployment).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) => Err(ExitError::new(EXIT_FAILED, format!("{}: {}", e.tag(), e)).into()),
    }
}

/// Read and validate a descriptor file.
pub fn read_descriptor(path: &Path) -> Result<Deployment, ExitError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ExitError::usage(format!("cannot read {}: {}", path.display(), e)))?;
    let deployment: Deployment = serde_json::from_str(&text)
        .map_err(|e| ExitError::usage(format!("invalid descriptor {}: {}", path.display(), e)))?;
    deployment
        .validate()
        .map_err(|e| ExitError::usage(format!("invalid descriptor {}: {}", path.display(), e)))?;
    Ok(deployment)
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
