// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator handles and tunables shared by every step of a run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use baton_adapters::{ContainerRuntime, PortAllocator, RouteClient, StateStore};
use baton_core::{Clock, SystemClock};

pub const DEFAULT_HEALTH_ATTEMPTS: u32 = 10;
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub health_attempts: u32,
    pub health_interval: Duration,
    /// Host the new container's port is published on and routes dial.
    pub upstream_host: String,
    /// Runtime options applied unless the deployment overrides them.
    pub runtime_defaults: BTreeMap<String, String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            health_attempts: DEFAULT_HEALTH_ATTEMPTS,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            upstream_host: "127.0.0.1".to_string(),
            runtime_defaults: BTreeMap::from([(
                "restart".to_string(),
                "unless-stopped".to_string(),
            )]),
        }
    }
}

/// Read-only bundle of collaborators for one or more runs.
#[derive(Clone)]
pub struct Context<S, P, R, A> {
    pub store: S,
    pub ports: P,
    pub runtime: R,
    pub routes: A,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<WorkflowConfig>,
}

impl<S, P, R, A> Context<S, P, R, A>
where
    S: StateStore,
    P: PortAllocator,
    R: ContainerRuntime,
    A: RouteClient,
{
    pub fn new(store: S, ports: P, runtime: R, routes: A) -> Self {
        Self {
            store,
            ports,
            runtime,
            routes,
            clock: Arc::new(SystemClock),
            config: Arc::new(WorkflowConfig::default()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = Arc::new(config);
        self
    }
}
