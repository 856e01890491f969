// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forward and compensating actions of the rollout steps.
//!
//! Each action takes only the collaborator it touches and the values it
//! was given, so a compensation undoes exactly what its forward action did.

use std::time::Duration;

use baton_adapters::{
    ContainerRuntime, ContainerSpec, PortAllocator, RouteClient, StateStore,
};
use baton_core::{
    container_name, AppRecord, AppStatus, Clock, Deployment, DeploymentId, Route, RuntimeKind,
};

use crate::context::WorkflowConfig;
use crate::error::DeployError;

/// A container started by this rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedContainer {
    pub id: String,
    pub name: String,
}

/// Current record for the application, `None` for a first deployment.
pub async fn load_state<S: StateStore>(
    store: &S,
    app_id: &str,
) -> Result<Option<AppRecord>, DeployError> {
    let previous = store.get(app_id).await.map_err(DeployError::LoadState)?;
    match &previous {
        Some(record) => {
            tracing::info!(app_id, container = %record.container_name, port = record.port, "previous deployment found")
        }
        None => tracing::info!(app_id, "no previous deployment"),
    }
    Ok(previous)
}

pub async fn allocate_port<P: PortAllocator>(ports: &P) -> Result<u16, DeployError> {
    ports.allocate().await.map_err(DeployError::PortAllocation)
}

pub async fn release_port<P: PortAllocator>(ports: &P, port: u16) -> Result<(), DeployError> {
    ports.release(port).await.map_err(DeployError::PortAllocation)
}

/// Container definition for a rollout: deterministic name, published port,
/// and runtime defaults overlaid with the deployment's own options.
pub fn container_spec(
    config: &WorkflowConfig,
    deployment: &Deployment,
    deployment_id: &DeploymentId,
    port: u16,
) -> ContainerSpec {
    let mut options = config.runtime_defaults.clone();
    options.extend(deployment.runtime.options.iter().map(|(k, v)| (k.clone(), v.clone())));
    ContainerSpec {
        runtime: deployment.runtime.kind,
        name: container_name(&deployment.app_id, deployment_id),
        image: deployment.image.clone(),
        host: config.upstream_host.clone(),
        host_port: port,
        internal_port: deployment.internal_port,
        env: deployment.env.clone(),
        options,
    }
}

pub async fn start_container<R: ContainerRuntime>(
    runtime: &R,
    spec: &ContainerSpec,
) -> Result<StartedContainer, DeployError> {
    let id = runtime.start(spec).await.map_err(DeployError::ContainerStart)?;
    Ok(StartedContainer { id, name: spec.name.clone() })
}

/// Stop and remove a container. Failures are logged, never returned.
pub async fn discard_container<R: ContainerRuntime>(runtime: &R, kind: RuntimeKind, name: &str) {
    if let Err(e) = runtime.stop(kind, name).await {
        tracing::warn!(container = %name, error = %e, "failed to stop container");
    }
    if let Err(e) = runtime.remove(kind, name).await {
        tracing::warn!(container = %name, error = %e, "failed to remove container");
    }
}

/// Poll until the container reports healthy, at most `attempts` times,
/// `interval` apart. Returns the number of polls made.
pub async fn health_check<R: ContainerRuntime>(
    runtime: &R,
    kind: RuntimeKind,
    name: &str,
    attempts: u32,
    interval: Duration,
) -> Result<u32, DeployError> {
    let mut last = "never polled".to_string();
    for attempt in 1..=attempts {
        match runtime.status(kind, name).await {
            Ok(status) if status.is_healthy() => {
                tracing::info!(container = %name, attempt, "container healthy");
                return Ok(attempt);
            }
            Ok(status) => {
                last = match &status.health {
                    Some(health) => format!("{} ({})", status.state, health),
                    None => status.state.clone(),
                };
            }
            Err(e) => last = e.to_string(),
        }
        tracing::debug!(container = %name, attempt, %last, "container not healthy yet");
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(DeployError::HealthCheck { container: name.to_string(), attempts, last })
}

/// Point the application's route at `port`. Returns whether a route was
/// written; deployments without domains publish nothing.
pub async fn switch_route<A: RouteClient>(
    routes: &A,
    deployment: &Deployment,
    port: u16,
) -> Result<bool, DeployError> {
    if deployment.domains.is_empty() {
        tracing::info!(app_id = %deployment.app_id, "no domains, route unchanged");
        return Ok(false);
    }
    let route = Route::new(deployment.route_id(), deployment.domains.clone(), port);
    routes.add_route(&route).await.map_err(DeployError::RouteSwitch)?;
    tracing::info!(route = %route.id, port, "route switched");
    Ok(true)
}

/// Undo [`switch_route`]: re-point the route at the previous deployment, or
/// remove it when the previous deployment published no route.
pub async fn restore_route<A: RouteClient>(
    routes: &A,
    deployment: &Deployment,
    previous: Option<&AppRecord>,
) -> Result<(), DeployError> {
    let route_id = deployment.route_id();
    match previous {
        Some(record) if !record.domains.is_empty() => {
            let route = Route::new(route_id, record.domains.clone(), record.port);
            routes.add_route(&route).await.map_err(DeployError::RouteSwitch)?;
            tracing::info!(route = %route.id, port = record.port, "route restored");
        }
        // No route existed before the rollout
        _ => {
            routes.remove_route(&route_id).await.map_err(DeployError::RouteSwitch)?;
            tracing::info!(route = %route_id, "route removed");
        }
    }
    Ok(())
}

/// Retire the previous deployment's container and port. Best-effort: the
/// new version is already serving, so failures are only logged.
pub async fn cleanup<R: ContainerRuntime, P: PortAllocator>(
    runtime: &R,
    ports: &P,
    kind: RuntimeKind,
    previous: Option<&AppRecord>,
) {
    let Some(previous) = previous else {
        tracing::debug!("nothing to clean up");
        return;
    };
    discard_container(runtime, kind, &previous.container_name).await;
    if let Err(e) = ports.release(previous.port).await {
        tracing::warn!(port = previous.port, error = %e, "failed to release previous port");
    }
    tracing::info!(container = %previous.container_name, port = previous.port, "previous deployment cleaned up");
}

/// Persist the record describing the new deployment.
pub async fn update_state<S: StateStore>(
    store: &S,
    clock: &dyn Clock,
    deployment: &Deployment,
    deployment_id: &DeploymentId,
    container: &StartedContainer,
    port: u16,
) -> Result<AppRecord, DeployError> {
    let record = AppRecord {
        app_id: deployment.app_id.clone(),
        deployment_id: Some(deployment_id.clone()),
        container_id: container.id.clone(),
        container_name: container.name.clone(),
        port,
        domains: deployment.domains.clone(),
        status: AppStatus::Running,
        updated_at_ms: clock.epoch_ms(),
    };
    store.put(&record.app_id, &record).await.map_err(DeployError::StateUpdate)?;
    tracing::info!(app_id = %record.app_id, port, "application state updated");
    Ok(record)
}

/// Undo [`update_state`]: delete the record of a first deployment, or
/// restore the previous record.
pub async fn restore_state<S: StateStore>(
    store: &S,
    app_id: &str,
    previous: Option<&AppRecord>,
) -> Result<(), DeployError> {
    match previous {
        Some(record) => {
            let mut record = record.clone();
            record.deployment_id = record.resolved_deployment_id();
            store.put(app_id, &record).await.map_err(DeployError::StateUpdate)?;
            tracing::info!(app_id, container = %record.container_name, "previous state restored");
        }
        None => {
            store.delete(app_id).await.map_err(DeployError::StateUpdate)?;
            tracing::info!(app_id, "state of first deployment deleted");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
