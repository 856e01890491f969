// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for rollouts: one at a time per application, each reported.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use baton_adapters::{
    ContainerRuntime, LogReporter, Outcome, PortAllocator, Reporter, RouteClient, StateStore,
};
use baton_core::{AppRecord, Deployment, DeploymentId};
use baton_saga::{Saga, SagaError};
use parking_lot::Mutex;
use tracing::Instrument;

use crate::context::Context;
use crate::error::DeployError;
use crate::workflow::{blue_green, Value, DEPLOYMENT_INPUT};

/// Runs blue-green rollouts.
///
/// Rollouts of different applications run concurrently; rollouts of the same
/// application wait for each other.
pub struct Deployer {
    saga: Saga<Value, DeployError>,
    reporter: Arc<dyn Reporter>,
    app_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Deployer {
    pub fn new<S, P, R, A>(ctx: Context<S, P, R, A>) -> Result<Self, DeployError>
    where
        S: StateStore,
        P: PortAllocator,
        R: ContainerRuntime,
        A: RouteClient,
    {
        let saga = blue_green(ctx).map_err(|e| DeployError::Internal(e.to_string()))?;
        Ok(Self { saga, reporter: Arc::new(LogReporter), app_locks: Mutex::new(HashMap::new()) })
    }

    pub fn with_reporter(mut self, reporter: impl Reporter) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    fn app_lock(&self, app_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.app_locks.lock().entry(app_id.to_string()).or_default().clone()
    }

    /// Forget the lock of `app_id` once no rollout holds or awaits it.
    fn prune_app_lock(&self, app_id: &str) {
        let mut locks = self.app_locks.lock();
        if locks.get(app_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(app_id);
        }
    }

    /// Run one rollout to completion and report its outcome.
    ///
    /// Assigns a deployment id when the descriptor has none. On failure the
    /// host is left as it was before the rollout, apart from a completed
    /// cleanup of the previous deployment.
    pub async fn deploy(&self, mut deployment: Deployment) -> Result<AppRecord, DeployError> {
        let deployment_id = deployment.deployment_id.get_or_insert_with(DeploymentId::new).clone();
        let app_id = deployment.app_id.clone();

        let span = tracing::info_span!("deploy", app_id = %app_id, deployment = %deployment_id);
        let result = self.run(deployment).instrument(span).await;

        let outcome = match &result {
            Ok(record) => Outcome::succeeded(deployment_id.clone(), &app_id, record.port),
            Err(e) => Outcome::failed(deployment_id.clone(), &app_id, e.tag(), e.to_string()),
        };
        if let Err(e) = self.reporter.report(&outcome).await {
            tracing::warn!(deployment = %deployment_id, error = %e, "failed to report outcome");
        }
        result
    }

    async fn run(&self, deployment: Deployment) -> Result<AppRecord, DeployError> {
        deployment.validate()?;

        let app_id = deployment.app_id.clone();
        let lock = self.app_lock(&app_id);
        let guard = match lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::info!("waiting for in-flight rollout of this application");
                lock.clone().lock_owned().await
            }
        };
        drop(lock);

        let result = self.rollout(deployment).await;
        drop(guard);
        self.prune_app_lock(&app_id);
        result
    }

    async fn rollout(&self, deployment: Deployment) -> Result<AppRecord, DeployError> {
        let start = Instant::now();
        let inputs = HashMap::from([(
            DEPLOYMENT_INPUT.to_string(),
            Value::Deployment(Arc::new(deployment)),
        )]);
        let (result, journal) = self.saga.execute(inputs).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        for (step, reason) in journal.compensation_failures() {
            tracing::warn!(step, reason, "compensation failed, host may need manual cleanup");
        }

        match result {
            Ok(Value::Record(record)) => {
                tracing::info!(port = record.port, elapsed_ms, "rollout succeeded");
                Ok(record)
            }
            Ok(other) => Err(DeployError::Internal(format!("unexpected rollout result {:?}", other))),
            Err(SagaError::Step { step, error }) => {
                tracing::error!(%step, tag = error.tag(), %error, elapsed_ms, "rollout failed");
                Err(error)
            }
            Err(e) => Err(DeployError::Internal(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "deployer_tests.rs"]
mod tests;
