// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory collaborators for tests. Every fake records its calls and can
//! be told to fail.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use baton_core::{AppRecord, Route, RuntimeKind};
use baton_process::CommandError;
use parking_lot::Mutex;

use crate::admin::{AdminError, RouteClient};
use crate::http::HttpError;
use crate::ports::{PortAllocator, PortError};
use crate::report::{Outcome, ReportError, Reporter};
use crate::runtime::{ContainerRuntime, ContainerSpec, ContainerStatus, RuntimeError};
use crate::store::{StateStore, StoreError};

fn injected_io(what: &str) -> StoreError {
    StoreError::Io {
        path: format!("memory://{}", what).into(),
        source: std::io::Error::other("injected failure"),
    }
}

// State store

#[derive(Default)]
struct StoreState {
    records: BTreeMap<String, AppRecord>,
    fail_get: bool,
    fail_put: bool,
    unacked_puts: usize,
    puts: Vec<AppRecord>,
    deletes: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<StoreState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: AppRecord) -> Self {
        self.inner.lock().records.insert(record.app_id.clone(), record);
        self
    }

    pub fn fail_get(&self, fail: bool) {
        self.inner.lock().fail_get = fail;
    }

    pub fn fail_put(&self, fail: bool) {
        self.inner.lock().fail_put = fail;
    }

    /// The next `count` puts store the record and then report an error.
    pub fn drop_put_acks(&self, count: usize) {
        self.inner.lock().unacked_puts = count;
    }

    /// Current record for `app_id`, bypassing failure injection.
    pub fn record(&self, app_id: &str) -> Option<AppRecord> {
        self.inner.lock().records.get(app_id).cloned()
    }

    /// Every record passed to a successful `put`.
    pub fn puts(&self) -> Vec<AppRecord> {
        self.inner.lock().puts.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.inner.lock().deletes.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        let state = self.inner.lock();
        if state.fail_get {
            return Err(injected_io(app_id));
        }
        Ok(state.records.get(app_id).cloned())
    }

    async fn put(&self, app_id: &str, record: &AppRecord) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        if state.fail_put {
            return Err(injected_io(app_id));
        }
        state.puts.push(record.clone());
        state.records.insert(app_id.to_string(), record.clone());
        if state.unacked_puts > 0 {
            state.unacked_puts -= 1;
            return Err(injected_io(app_id));
        }
        Ok(())
    }

    async fn delete(&self, app_id: &str) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state.deletes.push(app_id.to_string());
        state.records.remove(app_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AppRecord>, StoreError> {
        Ok(self.inner.lock().records.values().cloned().collect())
    }
}

// Port allocator

struct PortState {
    first: u16,
    held: BTreeSet<u16>,
    allocated: Vec<u16>,
    released: Vec<u16>,
    fail_allocate: bool,
    fail_release: bool,
}

/// Allocates upward from 10000 (or the given first port).
#[derive(Clone)]
pub struct FakePortAllocator {
    inner: Arc<Mutex<PortState>>,
}

impl Default for FakePortAllocator {
    fn default() -> Self {
        Self::starting_at(10000)
    }
}

impl FakePortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PortState {
                first,
                held: BTreeSet::new(),
                allocated: Vec::new(),
                released: Vec::new(),
                fail_allocate: false,
                fail_release: false,
            })),
        }
    }

    pub fn hold(&self, port: u16) {
        self.inner.lock().held.insert(port);
    }

    pub fn fail_allocate(&self, fail: bool) {
        self.inner.lock().fail_allocate = fail;
    }

    pub fn fail_release(&self, fail: bool) {
        self.inner.lock().fail_release = fail;
    }

    pub fn held(&self) -> Vec<u16> {
        self.inner.lock().held.iter().copied().collect()
    }

    pub fn allocated(&self) -> Vec<u16> {
        self.inner.lock().allocated.clone()
    }

    pub fn released(&self) -> Vec<u16> {
        self.inner.lock().released.clone()
    }
}

#[async_trait]
impl PortAllocator for FakePortAllocator {
    async fn allocate(&self) -> Result<u16, PortError> {
        let mut state = self.inner.lock();
        if state.fail_allocate {
            return Err(PortError::Unavailable("injected failure".to_string()));
        }
        let port = (state.first..=u16::MAX)
            .find(|p| !state.held.contains(p))
            .ok_or(PortError::Exhausted { start: state.first, end: u16::MAX })?;
        state.held.insert(port);
        state.allocated.push(port);
        Ok(port)
    }

    async fn release(&self, port: u16) -> Result<(), PortError> {
        let mut state = self.inner.lock();
        if state.fail_release {
            return Err(PortError::Unavailable("injected failure".to_string()));
        }
        state.held.remove(&port);
        state.released.push(port);
        Ok(())
    }
}

// Container runtime

/// Recorded container runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Start(ContainerSpec),
    Stop { runtime: RuntimeKind, name: String },
    Remove { runtime: RuntimeKind, name: String },
    Status { runtime: RuntimeKind, name: String },
}

struct RuntimeState {
    calls: Vec<RuntimeCall>,
    containers: BTreeSet<String>,
    statuses: VecDeque<ContainerStatus>,
    fallback: ContainerStatus,
    start_error: Option<String>,
    fail_stop: bool,
    fail_remove: bool,
}

/// Containers start instantly and report healthy unless scripted otherwise.
#[derive(Clone)]
pub struct FakeContainerRuntime {
    inner: Arc<Mutex<RuntimeState>>,
}

impl Default for FakeContainerRuntime {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RuntimeState {
                calls: Vec::new(),
                containers: BTreeSet::new(),
                statuses: VecDeque::new(),
                fallback: ContainerStatus::running(),
                start_error: None,
                fail_stop: false,
                fail_remove: false,
            })),
        }
    }
}

fn injected_command(name: &str, output: &str) -> RuntimeError {
    RuntimeError::Command(CommandError::NonZeroExit {
        command: name.to_string(),
        exit_code: Some(1),
        output: output.to_string(),
    })
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` is already running (e.g. a previous deployment).
    pub fn with_container(self, name: &str) -> Self {
        self.inner.lock().containers.insert(name.to_string());
        self
    }

    /// Statuses returned by successive `status` calls before the fallback.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = ContainerStatus>) {
        self.inner.lock().statuses.extend(statuses);
    }

    /// Status returned once the script is exhausted.
    pub fn set_fallback_status(&self, status: ContainerStatus) {
        self.inner.lock().fallback = status;
    }

    pub fn fail_start(&self, output: &str) {
        self.inner.lock().start_error = Some(output.to_string());
    }

    pub fn fail_stop(&self, fail: bool) {
        self.inner.lock().fail_stop = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.inner.lock().fail_remove = fail;
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Names of containers started and not yet removed.
    pub fn containers(&self) -> Vec<String> {
        self.inner.lock().containers.iter().cloned().collect()
    }

    pub fn status_calls(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, RuntimeCall::Status { .. })).count()
    }
}

#[async_trait]
impl ContainerRuntime for FakeContainerRuntime {
    async fn start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Start(spec.clone()));
        if let Some(output) = &state.start_error {
            return Err(injected_command(spec.runtime.binary(), output));
        }
        state.containers.insert(spec.name.clone());
        Ok(format!("id-{}", spec.name))
    }

    async fn stop(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Stop { runtime, name: name.to_string() });
        if state.fail_stop {
            return Err(injected_command(runtime.binary(), "stop failed"));
        }
        Ok(())
    }

    async fn remove(&self, runtime: RuntimeKind, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Remove { runtime, name: name.to_string() });
        if state.fail_remove {
            return Err(injected_command(runtime.binary(), "remove failed"));
        }
        state.containers.remove(name);
        Ok(())
    }

    async fn status(&self, runtime: RuntimeKind, name: &str) -> Result<ContainerStatus, RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Status { runtime, name: name.to_string() });
        let fallback = state.fallback.clone();
        Ok(state.statuses.pop_front().unwrap_or(fallback))
    }
}

// Route client

/// Recorded route client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCall {
    Add(Route),
    Remove(String),
}

#[derive(Default)]
struct RouteState {
    routes: BTreeMap<String, Route>,
    calls: Vec<RouteCall>,
    fail_add: bool,
    fail_remove: bool,
}

#[derive(Clone, Default)]
pub struct FakeRouteClient {
    inner: Arc<Mutex<RouteState>>,
}

fn injected_admin() -> AdminError {
    AdminError::Http(HttpError::UnexpectedStatus { status: 500, body: "injected failure".into() })
}

impl FakeRouteClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, route: Route) -> Self {
        self.inner.lock().routes.insert(route.id.clone(), route);
        self
    }

    pub fn fail_add(&self, fail: bool) {
        self.inner.lock().fail_add = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.inner.lock().fail_remove = fail;
    }

    pub fn route(&self, route_id: &str) -> Option<Route> {
        self.inner.lock().routes.get(route_id).cloned()
    }

    pub fn calls(&self) -> Vec<RouteCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl RouteClient for FakeRouteClient {
    async fn add_route(&self, route: &Route) -> Result<(), AdminError> {
        let mut state = self.inner.lock();
        state.calls.push(RouteCall::Add(route.clone()));
        if state.fail_add {
            return Err(injected_admin());
        }
        state.routes.insert(route.id.clone(), route.clone());
        Ok(())
    }

    async fn remove_route(&self, route_id: &str) -> Result<(), AdminError> {
        let mut state = self.inner.lock();
        state.calls.push(RouteCall::Remove(route_id.to_string()));
        if state.fail_remove {
            return Err(injected_admin());
        }
        state.routes.remove(route_id);
        Ok(())
    }

    async fn get_route(&self, route_id: &str) -> Result<Option<Route>, AdminError> {
        Ok(self.route(route_id))
    }
}

// Reporter

#[derive(Clone, Default)]
pub struct RecordingReporter {
    outcomes: Arc<Mutex<Vec<Outcome>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(&self, outcome: &Outcome) -> Result<(), ReportError> {
        self.outcomes.lock().push(outcome.clone());
        if *self.fail.lock() {
            return Err(ReportError::Http(HttpError::Request("injected failure".into())));
        }
        Ok(())
    }
}
