// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use baton_adapters::{FakeContainerRuntime, FakePortAllocator, FakeRouteClient, MemoryStateStore};
use baton_core::{AppRecord, AppStatus, Deployment, DeploymentId, FakeClock, Route};

use crate::context::{Context, WorkflowConfig};

pub(crate) type TestContext =
    Context<MemoryStateStore, FakePortAllocator, FakeContainerRuntime, FakeRouteClient>;

pub(crate) const HEALTH_ATTEMPTS: u32 = 3;
pub(crate) const HEALTH_INTERVAL: Duration = Duration::from_secs(1);

/// Fakes behind a context, kept so tests can inspect them after a run.
pub(crate) struct Harness {
    pub store: MemoryStateStore,
    pub ports: FakePortAllocator,
    pub runtime: FakeContainerRuntime,
    pub routes: FakeRouteClient,
    pub clock: FakeClock,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: MemoryStateStore::new(),
            ports: FakePortAllocator::new(),
            runtime: FakeContainerRuntime::new(),
            routes: FakeRouteClient::new(),
            clock: FakeClock::new(),
        }
    }

    /// Seed a running previous deployment: record, container, held port,
    /// and route.
    pub fn with_previous(mut self, record: AppRecord) -> Self {
        self.ports.hold(record.port);
        self.runtime = self.runtime.with_container(&record.container_name);
        if !record.domains.is_empty() {
            self.routes = self.routes.with_route(Route::new(
                baton_core::route_id(&record.app_id),
                record.domains.clone(),
                record.port,
            ));
        }
        self.store = self.store.with_record(record);
        self
    }

    pub fn config() -> WorkflowConfig {
        WorkflowConfig {
            health_attempts: HEALTH_ATTEMPTS,
            health_interval: HEALTH_INTERVAL,
            ..WorkflowConfig::default()
        }
    }

    pub fn context(&self) -> TestContext {
        Context::new(
            self.store.clone(),
            self.ports.clone(),
            self.runtime.clone(),
            self.routes.clone(),
        )
        .with_clock(self.clock.clone())
        .with_config(Self::config())
    }
}

pub(crate) fn deployment(app_id: &str, deployment_id: &str) -> Deployment {
    Deployment::new(app_id, "nginx:1.27", 80)
        .with_deployment_id(deployment_id)
        .with_domain(format!("{}.example.com", app_id))
}

pub(crate) fn previous_record(app_id: &str, deployment_id: &str, port: u16) -> AppRecord {
    let id = DeploymentId::from(deployment_id);
    let name = baton_core::container_name(app_id, &id);
    AppRecord {
        app_id: app_id.to_string(),
        deployment_id: Some(id),
        container_id: format!("id-{}", name),
        container_name: name,
        port,
        domains: vec![format!("{}.example.com", app_id)],
        status: AppStatus::Running,
        updated_at_ms: 500_000,
    }
}
