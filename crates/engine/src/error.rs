// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use baton_adapters::{AdminError, PortError, RuntimeError, StoreError};
use baton_core::DeploymentError;
use thiserror::Error;

/// Failure of one rollout, tagged by the step that failed.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("invalid deployment: {0}")]
    Invalid(#[from] DeploymentError),
    #[error("failed to load application state: {0}")]
    LoadState(#[source] StoreError),
    #[error("failed to allocate port: {0}")]
    PortAllocation(#[source] PortError),
    #[error("failed to start container: {0}")]
    ContainerStart(#[source] RuntimeError),
    #[error("container {container} not healthy after {attempts} attempts (last: {last})")]
    HealthCheck { container: String, attempts: u32, last: String },
    #[error("failed to switch route: {0}")]
    RouteSwitch(#[source] AdminError),
    #[error("failed to update application state: {0}")]
    StateUpdate(#[source] StoreError),
    #[error("workflow error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Stable tag used in logs and outcome reports.
    pub fn tag(&self) -> &'static str {
        match self {
            DeployError::Invalid(_) => "invalid-deployment",
            DeployError::LoadState(_) => "load-state-failed",
            DeployError::PortAllocation(_) => "port-allocation-failed",
            DeployError::ContainerStart(_) => "container-start-failed",
            DeployError::HealthCheck { .. } => "health-check-failed",
            DeployError::RouteSwitch(_) => "route-switch-failed",
            DeployError::StateUpdate(_) => "state-update-failed",
            DeployError::Internal(_) => "internal-error",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
