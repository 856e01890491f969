// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of the rollout steps into a saga.

use std::sync::Arc;

use baton_adapters::{ContainerRuntime, PortAllocator, RouteClient, StateStore};
use baton_core::{AppRecord, Clock, Deployment, DeploymentId};
use baton_saga::{DefinitionError, Saga, Step, StepInputs};

use crate::context::{Context, WorkflowConfig};
use crate::error::DeployError;
use crate::steps::{self, StartedContainer};

/// Saga input carrying the deployment descriptor.
pub const DEPLOYMENT_INPUT: &str = "deployment";

pub(crate) const LOAD_STATE: &str = "load_state";
pub(crate) const ALLOCATE_PORT: &str = "allocate_port";
pub(crate) const START_CONTAINER: &str = "start_container";
pub(crate) const HEALTH_CHECK: &str = "health_check";
pub(crate) const SWITCH_ROUTE: &str = "switch_route";
pub(crate) const CLEANUP: &str = "cleanup";
pub(crate) const UPDATE_STATE: &str = "update_state";

/// Values flowing between rollout steps.
#[derive(Debug, Clone)]
pub enum Value {
    Deployment(Arc<Deployment>),
    Previous(Option<AppRecord>),
    Port(u16),
    Container(StartedContainer),
    Healthy { attempts: u32 },
    Routed { switched: bool },
    Cleaned,
    Record(AppRecord),
}

fn deployment(inputs: &StepInputs<Value>) -> Result<Arc<Deployment>, DeployError> {
    match inputs.input(DEPLOYMENT_INPUT) {
        Some(Value::Deployment(d)) => Ok(d.clone()),
        _ => Err(missing(DEPLOYMENT_INPUT)),
    }
}

fn deployment_id(deployment: &Deployment) -> Result<DeploymentId, DeployError> {
    deployment
        .deployment_id
        .clone()
        .ok_or_else(|| DeployError::Internal("deployment id not assigned".to_string()))
}

fn previous(inputs: &StepInputs<Value>) -> Result<Option<AppRecord>, DeployError> {
    match inputs.step(LOAD_STATE) {
        Some(Value::Previous(p)) => Ok(p.clone()),
        _ => Err(missing(LOAD_STATE)),
    }
}

fn port(inputs: &StepInputs<Value>) -> Result<u16, DeployError> {
    match inputs.step(ALLOCATE_PORT) {
        Some(Value::Port(p)) => Ok(*p),
        _ => Err(missing(ALLOCATE_PORT)),
    }
}

fn container(inputs: &StepInputs<Value>) -> Result<StartedContainer, DeployError> {
    match inputs.step(START_CONTAINER) {
        Some(Value::Container(c)) => Ok(c.clone()),
        _ => Err(missing(START_CONTAINER)),
    }
}

fn missing(name: &str) -> DeployError {
    DeployError::Internal(format!("step input `{}` missing", name))
}

type RolloutStep = Step<Value, DeployError>;

async fn run_load_state<S: StateStore>(
    store: S,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    steps::load_state(&store, &deployment.app_id).await.map(Value::Previous)
}

async fn run_allocate_port<P: PortAllocator>(ports: P) -> Result<Value, DeployError> {
    steps::allocate_port(&ports).await.map(Value::Port)
}

async fn undo_allocate_port<P: PortAllocator>(ports: P, output: Value) -> Result<(), DeployError> {
    match output {
        Value::Port(port) => steps::release_port(&ports, port).await,
        _ => Err(missing(ALLOCATE_PORT)),
    }
}

async fn run_start_container<R: ContainerRuntime>(
    runtime: R,
    config: Arc<WorkflowConfig>,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    let id = deployment_id(&deployment)?;
    let spec = steps::container_spec(&config, &deployment, &id, port(&inputs)?);
    steps::start_container(&runtime, &spec).await.map(Value::Container)
}

async fn undo_start_container<R: ContainerRuntime>(
    runtime: R,
    output: Value,
    inputs: StepInputs<Value>,
) -> Result<(), DeployError> {
    let deployment = deployment(&inputs)?;
    if let Value::Container(container) = output {
        steps::discard_container(&runtime, deployment.runtime.kind, &container.name).await;
    }
    Ok(())
}

async fn run_health_check<R: ContainerRuntime>(
    runtime: R,
    config: Arc<WorkflowConfig>,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    let container = container(&inputs)?;
    let attempts = steps::health_check(
        &runtime,
        deployment.runtime.kind,
        &container.name,
        config.health_attempts,
        config.health_interval,
    )
    .await?;
    Ok(Value::Healthy { attempts })
}

async fn run_switch_route<A: RouteClient>(
    routes: A,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    let switched = steps::switch_route(&routes, &deployment, port(&inputs)?).await?;
    Ok(Value::Routed { switched })
}

async fn undo_switch_route<A: RouteClient>(
    routes: A,
    output: Value,
    inputs: StepInputs<Value>,
) -> Result<(), DeployError> {
    if !matches!(output, Value::Routed { switched: true }) {
        return Ok(());
    }
    let deployment = deployment(&inputs)?;
    steps::restore_route(&routes, &deployment, previous(&inputs)?.as_ref()).await
}

async fn run_cleanup<R: ContainerRuntime, P: PortAllocator>(
    runtime: R,
    ports: P,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    let previous = previous(&inputs)?;
    steps::cleanup(&runtime, &ports, deployment.runtime.kind, previous.as_ref()).await;
    Ok(Value::Cleaned)
}

async fn run_update_state<S: StateStore>(
    store: S,
    clock: Arc<dyn Clock>,
    inputs: StepInputs<Value>,
) -> Result<Value, DeployError> {
    let deployment = deployment(&inputs)?;
    let previous = previous(&inputs)?;
    let result = steps::update_state(
        &store,
        clock.as_ref(),
        &deployment,
        &deployment_id(&deployment)?,
        &container(&inputs)?,
        port(&inputs)?,
    )
    .await;
    match result {
        Ok(record) => Ok(Value::Record(record)),
        Err(e) => {
            // A failed put may still have landed, and the saga never
            // compensates the step that failed
            if let Err(undo) =
                steps::restore_state(&store, &deployment.app_id, previous.as_ref()).await
            {
                tracing::warn!(app_id = %deployment.app_id, error = %undo, "failed to restore state after failed update");
            }
            Err(e)
        }
    }
}

async fn undo_update_state<S: StateStore>(
    store: S,
    inputs: StepInputs<Value>,
) -> Result<(), DeployError> {
    let deployment = deployment(&inputs)?;
    steps::restore_state(&store, &deployment.app_id, previous(&inputs)?.as_ref()).await
}

/// Build the blue-green rollout saga over `ctx`.
///
/// Run it with the deployment (with its id assigned) bound to
/// [`DEPLOYMENT_INPUT`]; its result is the new [`Value::Record`].
pub fn blue_green<S, P, R, A>(
    ctx: Context<S, P, R, A>,
) -> Result<Saga<Value, DeployError>, DefinitionError>
where
    S: StateStore,
    P: PortAllocator,
    R: ContainerRuntime,
    A: RouteClient,
{
    let c = ctx.clone();
    let load_state = RolloutStep::new(LOAD_STATE, move |inputs| {
        run_load_state(c.store.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT);

    let (c, u) = (ctx.clone(), ctx.clone());
    let allocate_port = RolloutStep::new(ALLOCATE_PORT, move |_| run_allocate_port(c.ports.clone()))
        .compensate(move |output, _| undo_allocate_port(u.ports.clone(), output));

    let (c, u) = (ctx.clone(), ctx.clone());
    let start_container = RolloutStep::new(START_CONTAINER, move |inputs| {
        run_start_container(c.runtime.clone(), c.config.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT)
    .uses(ALLOCATE_PORT)
    .compensate(move |output, inputs| undo_start_container(u.runtime.clone(), output, inputs));

    let c = ctx.clone();
    let health_check = RolloutStep::new(HEALTH_CHECK, move |inputs| {
        run_health_check(c.runtime.clone(), c.config.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT)
    .uses(START_CONTAINER);

    let (c, u) = (ctx.clone(), ctx.clone());
    let switch_route = RolloutStep::new(SWITCH_ROUTE, move |inputs| {
        run_switch_route(c.routes.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT)
    .uses(ALLOCATE_PORT)
    .uses(LOAD_STATE)
    .after(HEALTH_CHECK)
    .compensate(move |output, inputs| undo_switch_route(u.routes.clone(), output, inputs));

    // One-way: no compensation once the new version serves traffic
    let c = ctx.clone();
    let cleanup = RolloutStep::new(CLEANUP, move |inputs| {
        run_cleanup(c.runtime.clone(), c.ports.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT)
    .uses(LOAD_STATE)
    .after(SWITCH_ROUTE);

    let (c, u) = (ctx.clone(), ctx);
    let update_state = RolloutStep::new(UPDATE_STATE, move |inputs| {
        run_update_state(c.store.clone(), c.clock.clone(), inputs)
    })
    .input(DEPLOYMENT_INPUT)
    .uses(LOAD_STATE)
    .uses(ALLOCATE_PORT)
    .uses(START_CONTAINER)
    .after(CLEANUP)
    .compensate(move |_, inputs| undo_update_state(u.store.clone(), inputs));

    Saga::builder("blue-green")
        .step(load_state)
        .step(allocate_port)
        .step(start_container)
        .step(health_check)
        .step(switch_route)
        .step(cleanup)
        .step(update_state)
        .terminal(UPDATE_STATE)
        .build()
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
