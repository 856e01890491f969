// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-core: domain types shared by the baton deployment agent

pub mod clock;
pub mod deployment;
pub mod id;
pub mod record;
pub mod route;

pub use clock::{Clock, FakeClock, SystemClock};
pub use deployment::{
    container_name, deployment_id_from_container, route_id, Deployment, DeploymentError,
    DeploymentId, RuntimeBinding, RuntimeKind,
};
pub use id::short;
pub use record::{AppRecord, AppStatus};
pub use route::{Route, RouteError};
