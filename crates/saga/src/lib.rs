// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-saga: dependency-ordered step execution with compensation.
//!
//! A [`Saga`] is a validated set of [`Step`]s. Running it starts every
//! step whose predecessors have completed, runs independent steps
//! concurrently, and on the first failure compensates the completed steps
//! in reverse completion order before returning the original error.

mod error;
mod graph;
mod journal;
mod saga;
mod step;

pub use error::{DefinitionError, SagaError};
pub use journal::{InvocationOutcome, Journal, StepInvocation};
pub use saga::{Saga, SagaBuilder};
pub use step::{Source, Step, StepInputs};
