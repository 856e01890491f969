// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transient record of one saga run.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Completed,
    Failed(String),
    Compensated,
    CompensationFailed(String),
    /// The step has no compensating action.
    CompensationSkipped,
}

#[derive(Debug, Clone)]
pub struct StepInvocation {
    pub step: String,
    pub started_at: Instant,
    pub elapsed: Duration,
    pub outcome: InvocationOutcome,
}

/// Step invocations in the order they finished.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub invocations: Vec<StepInvocation>,
}

impl Journal {
    pub(crate) fn record(
        &mut self,
        step: &str,
        started_at: Instant,
        outcome: InvocationOutcome,
    ) {
        self.invocations.push(StepInvocation {
            step: step.to_string(),
            started_at,
            elapsed: started_at.elapsed(),
            outcome,
        });
    }

    /// Names of steps that completed, in completion order.
    pub fn completed(&self) -> Vec<&str> {
        self.with_outcome(|o| matches!(o, InvocationOutcome::Completed))
    }

    /// Names of steps whose compensation ran (successfully or not), in order.
    pub fn compensated(&self) -> Vec<&str> {
        self.with_outcome(|o| {
            matches!(o, InvocationOutcome::Compensated | InvocationOutcome::CompensationFailed(_))
        })
    }

    /// Compensation failures as `(step, reason)`.
    pub fn compensation_failures(&self) -> Vec<(&str, &str)> {
        self.invocations
            .iter()
            .filter_map(|i| match &i.outcome {
                InvocationOutcome::CompensationFailed(reason) => {
                    Some((i.step.as_str(), reason.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    fn with_outcome(&self, pred: impl Fn(&InvocationOutcome) -> bool) -> Vec<&str> {
        self.invocations.iter().filter(|i| pred(&i.outcome)).map(|i| i.step.as_str()).collect()
    }
}
