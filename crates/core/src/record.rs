// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application record: the persisted current deployment of one application.

use crate::deployment::{deployment_id_from_container, DeploymentId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Running,
    Stopped,
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppStatus::Running => write!(f, "running"),
            AppStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Current deployment of one application, keyed by `app_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub app_id: String,
    /// Absent in records written before deployment ids were tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<DeploymentId>,
    pub container_id: String,
    pub container_name: String,
    pub port: u16,
    #[serde(default)]
    pub domains: Vec<String>,
    pub status: AppStatus,
    #[serde(default)]
    pub updated_at_ms: u64,
}

impl AppRecord {
    /// Deployment id of this record, recovered from the container name
    /// when the record predates stored deployment ids.
    pub fn resolved_deployment_id(&self) -> Option<DeploymentId> {
        self.deployment_id
            .clone()
            .or_else(|| deployment_id_from_container(&self.app_id, &self.container_name))
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
