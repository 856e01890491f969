// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Saga scheduling and compensation.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::time::Instant;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::Instrument;

use crate::error::{DefinitionError, SagaError};
use crate::graph;
use crate::journal::{InvocationOutcome, Journal};
use crate::step::{Step, StepInputs};

/// A validated, reusable set of steps with a terminal step.
#[derive(Debug)]
pub struct Saga<V, E> {
    name: String,
    steps: Vec<Step<V, E>>,
    terminal: String,
}

pub struct SagaBuilder<V, E> {
    name: String,
    steps: Vec<Step<V, E>>,
    terminal: Option<String>,
}

impl<V, E> SagaBuilder<V, E> {
    pub fn step(mut self, step: Step<V, E>) -> Self {
        self.steps.push(step);
        self
    }

    /// Step whose result is the saga's result. Defaults to the last step added.
    pub fn terminal(mut self, step: impl Into<String>) -> Self {
        self.terminal = Some(step.into());
        self
    }

    pub fn build(self) -> Result<Saga<V, E>, DefinitionError> {
        let terminal = match self.terminal {
            Some(t) => t,
            None => self.steps.last().map(|s| s.name.clone()).ok_or(DefinitionError::Empty)?,
        };
        graph::validate(&self.steps, &terminal)?;
        Ok(Saga { name: self.name, steps: self.steps, terminal })
    }
}

/// A step that finished successfully and may need undoing.
struct Completed<V> {
    index: usize,
    output: V,
    inputs: StepInputs<V>,
}

impl<V, E> Saga<V, E>
where
    V: Clone + Send + 'static,
    E: Display + Send + 'static,
{
    pub fn builder(name: impl Into<String>) -> SagaBuilder<V, E> {
        SagaBuilder { name: name.into(), steps: Vec::new(), terminal: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step<V, E>] {
        &self.steps
    }

    /// Run to completion, returning the terminal step's result.
    pub async fn run(&self, inputs: HashMap<String, V>) -> Result<V, SagaError<E>> {
        self.execute(inputs).await.0
    }

    /// Run to completion, also returning the journal of step invocations.
    pub async fn execute(&self, inputs: HashMap<String, V>) -> (Result<V, SagaError<E>>, Journal) {
        let span = tracing::info_span!("saga", saga = %self.name);
        self.execute_inner(inputs).instrument(span).await
    }

    async fn execute_inner(
        &self,
        inputs: HashMap<String, V>,
    ) -> (Result<V, SagaError<E>>, Journal) {
        let mut journal = Journal::default();

        if let Some(missing) =
            self.steps.iter().flat_map(|s| s.saga_inputs()).find(|n| !inputs.contains_key(*n))
        {
            return (Err(SagaError::MissingInput(missing.to_string())), journal);
        }

        let run_start = Instant::now();
        let mut results: HashMap<String, V> = HashMap::new();
        let mut completed: Vec<Completed<V>> = Vec::new();
        let mut started: HashSet<usize> = HashSet::new();
        let mut failure: Option<(String, E)> = None;
        let mut running = FuturesUnordered::new();

        loop {
            // Nothing new starts once a step has failed.
            if failure.is_none() {
                for (index, step) in self.steps.iter().enumerate() {
                    if started.contains(&index)
                        || !step.predecessors().all(|p| results.contains_key(p))
                    {
                        continue;
                    }
                    started.insert(index);
                    let step_inputs = StepInputs::gather(&step.sources, &inputs, &results);
                    let action = step.action.clone();
                    tracing::info!(step = %step.name, "step started");
                    running.push(async move {
                        let started_at = Instant::now();
                        let result = action(step_inputs.clone()).await;
                        (index, started_at, step_inputs, result)
                    });
                }
            }

            let Some((index, started_at, step_inputs, result)) = running.next().await else {
                break;
            };
            let name = &self.steps[index].name;
            let elapsed_ms = started_at.elapsed().as_millis() as u64;
            match result {
                Ok(output) => {
                    tracing::info!(step = %name, elapsed_ms, "step completed");
                    journal.record(name, started_at, InvocationOutcome::Completed);
                    results.insert(name.clone(), output.clone());
                    completed.push(Completed { index, output, inputs: step_inputs });
                }
                Err(error) => {
                    tracing::error!(step = %name, elapsed_ms, %error, "step failed");
                    journal.record(name, started_at, InvocationOutcome::Failed(error.to_string()));
                    if failure.is_none() {
                        failure = Some((name.clone(), error));
                    }
                }
            }
        }

        if let Some((step, error)) = failure {
            self.compensate(completed, &mut journal).await;
            tracing::warn!(
                failed_step = %step,
                elapsed_ms = run_start.elapsed().as_millis() as u64,
                "saga compensated"
            );
            return (Err(SagaError::Step { step, error }), journal);
        }

        let outcome = match results.remove(&self.terminal) {
            Some(value) => {
                tracing::info!(
                    elapsed_ms = run_start.elapsed().as_millis() as u64,
                    "saga completed"
                );
                Ok(value)
            }
            None => {
                let unscheduled = self
                    .steps
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !started.contains(i))
                    .map(|(_, s)| s.name.clone())
                    .collect();
                Err(SagaError::Unscheduled(unscheduled))
            }
        };
        (outcome, journal)
    }

    /// Undo completed steps, newest first. Failures are logged and recorded,
    /// never propagated.
    async fn compensate(&self, completed: Vec<Completed<V>>, journal: &mut Journal) {
        for done in completed.into_iter().rev() {
            let step = &self.steps[done.index];
            let started_at = Instant::now();
            let Some(compensation) = &step.compensation else {
                journal.record(&step.name, started_at, InvocationOutcome::CompensationSkipped);
                continue;
            };
            tracing::info!(step = %step.name, "compensating");
            match compensation(done.output, done.inputs).await {
                Ok(()) => {
                    journal.record(&step.name, started_at, InvocationOutcome::Compensated);
                }
                Err(error) => {
                    tracing::warn!(step = %step.name, %error, "compensation failed, continuing");
                    journal.record(
                        &step.name,
                        started_at,
                        InvocationOutcome::CompensationFailed(error.to_string()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "saga_tests.rs"]
mod tests;
