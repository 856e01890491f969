// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// A saga definition that cannot be scheduled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("saga has no steps")]
    Empty,
    #[error("duplicate step name `{0}`")]
    DuplicateStep(String),
    #[error("step `{step}` depends on unknown step `{dependency}`")]
    UnknownDependency { step: String, dependency: String },
    #[error("dependency cycle through steps: {}", .0.join(", "))]
    Cycle(Vec<String>),
    #[error("terminal step `{0}` is not defined")]
    UnknownTerminal(String),
}

/// Failure of a saga run.
///
/// `Step` carries the first failing step's error unchanged; compensation
/// outcomes never replace it.
#[derive(Debug, Error)]
pub enum SagaError<E> {
    #[error("step `{step}` failed: {error}")]
    Step { step: String, error: E },
    #[error("saga input `{0}` was not supplied")]
    MissingInput(String),
    #[error("steps never became runnable: {}", .0.join(", "))]
    Unscheduled(Vec<String>),
}

impl<E> SagaError<E> {
    /// Name of the failing step, if a step failed.
    pub fn step(&self) -> Option<&str> {
        match self {
            SagaError::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// The failing step's error, or `self` for run-level failures.
    pub fn into_step_error(self) -> Result<E, Self> {
        match self {
            SagaError::Step { error, .. } => Ok(error),
            other => Err(other),
        }
    }
}
