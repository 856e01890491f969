// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollout outcome reporting to the control plane.

use std::time::Duration;

use async_trait::async_trait;
use baton_core::DeploymentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::{self, HttpError};

const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
}

/// Final result of one rollout as seen by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub deployment_id: DeploymentId,
    pub app_id: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Port now serving the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Outcome {
    pub fn succeeded(deployment_id: DeploymentId, app_id: impl Into<String>, port: u16) -> Self {
        Self {
            deployment_id,
            app_id: app_id.into(),
            status: OutcomeStatus::Succeeded,
            error_tag: None,
            error: None,
            port: Some(port),
        }
    }

    pub fn failed(
        deployment_id: DeploymentId,
        app_id: impl Into<String>,
        tag: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            deployment_id,
            app_id: app_id.into(),
            status: OutcomeStatus::Failed,
            error_tag: Some(tag.to_string()),
            error: Some(error.into()),
            port: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("failed to encode outcome: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Reporter: Send + Sync + 'static {
    async fn report(&self, outcome: &Outcome) -> Result<(), ReportError>;
}

/// POSTs outcomes to `/api/deployments/<deployment_id>/outcome`.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    addr: String,
    timeout: Duration,
}

impl HttpReporter {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), timeout: REPORT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(&self, outcome: &Outcome) -> Result<(), ReportError> {
        let body = serde_json::to_string(outcome)?;
        let path = format!("/api/deployments/{}/outcome", outcome.deployment_id);
        http::request(&self.addr, "POST", &path, Some(&body), self.timeout)
            .await?
            .error_for_status()?;
        tracing::info!(deployment = %outcome.deployment_id, status = ?outcome.status, "outcome reported");
        Ok(())
    }
}

/// Reporter for agents without a control plane: outcomes only reach the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

#[async_trait]
impl Reporter for LogReporter {
    async fn report(&self, outcome: &Outcome) -> Result<(), ReportError> {
        match outcome.status {
            OutcomeStatus::Succeeded => tracing::info!(
                deployment = %outcome.deployment_id,
                app_id = %outcome.app_id,
                port = ?outcome.port,
                "rollout succeeded"
            ),
            OutcomeStatus::Failed => tracing::warn!(
                deployment = %outcome.deployment_id,
                app_id = %outcome.app_id,
                tag = outcome.error_tag.as_deref().unwrap_or_default(),
                error = outcome.error.as_deref().unwrap_or_default(),
                "rollout failed"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
