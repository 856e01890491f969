// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment descriptor: one rollout request as received from the control plane.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

crate::define_id! {
    /// Identifier of one rollout. Embedded in the container name so
    /// retried or concurrent runs never collide.
    pub struct DeploymentId("dep-");
}

/// Container runtime the deployment is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    #[default]
    Docker,
    Podman,
}

impl RuntimeKind {
    /// CLI binary driving this runtime.
    pub fn binary(&self) -> &'static str {
        match self {
            RuntimeKind::Docker => "docker",
            RuntimeKind::Podman => "podman",
        }
    }
}

/// Runtime binding plus runtime-specific options (e.g. `network`, `memory`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeBinding {
    #[serde(default)]
    pub kind: RuntimeKind,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeploymentError {
    #[error("invalid application id {0:?}: use [a-z0-9_.-], starting with a letter or digit")]
    InvalidAppId(String),
    #[error("image reference is empty")]
    MissingImage,
    #[error("container port must be non-zero")]
    InvalidPort,
}

/// One rollout request. Immutable for the duration of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub app_id: String,
    /// Assigned by the control plane; generated by the agent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<DeploymentId>,
    pub image: String,
    /// Port the application listens on inside the container.
    pub internal_port: u16,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub runtime: RuntimeBinding,
}

impl Deployment {
    pub fn new(app_id: impl Into<String>, image: impl Into<String>, internal_port: u16) -> Self {
        Self {
            app_id: app_id.into(),
            deployment_id: None,
            image: image.into(),
            internal_port,
            domains: Vec::new(),
            env: BTreeMap::new(),
            runtime: RuntimeBinding::default(),
        }
    }

    pub fn with_deployment_id(mut self, id: impl Into<DeploymentId>) -> Self {
        self.deployment_id = Some(id.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_runtime(mut self, kind: RuntimeKind) -> Self {
        self.runtime.kind = kind;
        self
    }

    pub fn with_runtime_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runtime.options.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), DeploymentError> {
        let mut chars = self.app_id.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        let valid_rest = chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
        });
        if !valid_start || !valid_rest {
            return Err(DeploymentError::InvalidAppId(self.app_id.clone()));
        }
        if self.image.trim().is_empty() {
            return Err(DeploymentError::MissingImage);
        }
        if self.internal_port == 0 {
            return Err(DeploymentError::InvalidPort);
        }
        Ok(())
    }

    /// Stable identifier of the route published for this application.
    pub fn route_id(&self) -> String {
        route_id(&self.app_id)
    }
}

/// Route identifier for an application: `<app_id>-route`.
pub fn route_id(app_id: &str) -> String {
    format!("{}-route", app_id)
}

/// Container name for one rollout of an application: `<app_id>-<deployment_id>`.
pub fn container_name(app_id: &str, deployment_id: &DeploymentId) -> String {
    format!("{}-{}", app_id, deployment_id)
}

/// Recover the deployment id from a container name built by [`container_name`].
pub fn deployment_id_from_container(app_id: &str, container: &str) -> Option<DeploymentId> {
    container
        .strip_prefix(app_id)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|id| !id.is_empty())
        .map(DeploymentId::from)
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
