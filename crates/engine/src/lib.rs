// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-engine: the blue-green rollout workflow
//!
//! The workflow is a fixed saga over seven steps:
//!
//! ```text
//! load_state ─────────────┬──────────────┬─────────────┐
//! allocate_port ─► start_container ─► health_check ─► switch_route ─► cleanup ─► update_state
//! ```
//!
//! Any failure compensates the completed steps in reverse completion order,
//! leaving routing, containers, ports, and state as they were before the
//! rollout (cleanup is one-way once reached). [`Deployer`] runs the workflow
//! one rollout per application at a time and reports each outcome.

mod context;
mod deployer;
mod error;
pub mod steps;
mod workflow;

pub use context::{Context, WorkflowConfig, DEFAULT_HEALTH_ATTEMPTS, DEFAULT_HEALTH_INTERVAL};
pub use deployer::Deployer;
pub use error::DeployError;
pub use steps::StartedContainer;
pub use workflow::{blue_green, Value, DEPLOYMENT_INPUT};

#[cfg(test)]
mod test_helpers;
