// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-adapters: collaborators of the rollout workflow
//!
//! Each collaborator is a trait the workflow is generic over, plus the
//! implementation used on a real host:
//!
//! - [`StateStore`] / [`FileStateStore`]: one JSON record per application
//! - [`PortAllocator`] / [`LocalPortAllocator`]: upstream ports from a fixed range
//! - [`ContainerRuntime`] / [`CliRuntime`]: docker or podman through the process runtime
//! - [`RouteClient`] / [`AdminClient`]: reverse-proxy admin API
//! - [`Reporter`] / [`HttpReporter`]: rollout outcomes to the control plane
//!
//! [`GitFetcher`] retrieves deployable source.

mod admin;
mod fetch;
pub mod http;
mod ports;
mod report;
mod runtime;
mod store;
#[cfg(test)]
mod test_server;

pub use admin::{AdminClient, AdminError, RouteClient, DEFAULT_ADMIN_ADDR, DEFAULT_SERVER};
pub use fetch::{FetchError, GitFetcher};
pub use http::HttpError;
pub use ports::{LocalPortAllocator, PortAllocator, PortError};
pub use report::{HttpReporter, LogReporter, Outcome, OutcomeStatus, ReportError, Reporter};
pub use runtime::{CliRuntime, ContainerRuntime, ContainerSpec, ContainerStatus, RuntimeError};
pub use store::{FileStateStore, StateStore, StoreError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{
    FakeContainerRuntime, FakePortAllocator, FakeRouteClient, MemoryStateStore,
    RecordingReporter, RouteCall, RuntimeCall,
};
