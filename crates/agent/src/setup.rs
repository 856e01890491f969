// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of host collaborators from the environment.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use baton_adapters::{
    AdminClient, CliRuntime, FileStateStore, HttpReporter, LocalPortAllocator, StateStore,
};
use baton_engine::{Context, Deployer, WorkflowConfig};

use crate::env;
use crate::exit_error::ExitError;

pub fn state_dir() -> Result<PathBuf, ExitError> {
    env::state_dir()
        .ok_or_else(|| ExitError::usage("cannot determine state directory; set BATON_STATE_DIR"))
}

pub fn state_store() -> Result<FileStateStore, ExitError> {
    Ok(FileStateStore::new(state_dir()?))
}

/// Hold the ports of every recorded application so new rollouts never
/// collide with a running deployment. Returns the number of ports held.
pub async fn reserve_live_ports<S: StateStore>(
    store: &S,
    ports: &LocalPortAllocator,
) -> Result<usize> {
    let records = store.list().await.context("failed to list application records")?;
    for record in &records {
        ports.reserve(record.port);
    }
    Ok(records.len())
}

pub fn workflow_config() -> WorkflowConfig {
    WorkflowConfig {
        health_attempts: env::health_attempts(),
        health_interval: env::health_interval(),
        upstream_host: env::upstream_host(),
        ..WorkflowConfig::default()
    }
}

/// Build a deployer over the host's container runtime, proxy, and state.
pub async fn deployer() -> Result<Deployer> {
    let store = state_store()?;
    let upstream_host = env::upstream_host();
    let ports = LocalPortAllocator::new(env::port_range(), upstream_host.clone());
    let reserved = reserve_live_ports(&store, &ports).await?;
    tracing::debug!(state = %store.dir().display(), reserved, "state loaded");

    let runtime = CliRuntime::new().with_timeout(env::command_timeout());
    let routes = AdminClient::new(env::admin_addr(), upstream_host).with_server(env::proxy_server());
    let ctx = Context::new(store, ports, runtime, routes).with_config(workflow_config());

    let deployer = Deployer::new(ctx)?;
    Ok(match env::control_plane_addr() {
        Some(addr) => deployer.with_reporter(HttpReporter::new(addr)),
        None => deployer,
    })
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
