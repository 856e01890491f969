// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

pub(crate) type Action<V, E> = Arc<dyn Fn(StepInputs<V>) -> BoxFuture<'static, Result<V, E>> + Send + Sync>;
pub(crate) type Compensation<V, E> =
    Arc<dyn Fn(V, StepInputs<V>) -> BoxFuture<'static, Result<(), E>> + Send + Sync>;

/// Where a step input comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A value supplied to `Saga::run`.
    Input(String),
    /// The successful result of another step.
    Step(String),
}

/// Values bound to a step's declared inputs.
#[derive(Debug, Clone)]
pub struct StepInputs<V> {
    inputs: HashMap<String, V>,
    steps: HashMap<String, V>,
}

impl<V> Default for StepInputs<V> {
    fn default() -> Self {
        Self { inputs: HashMap::new(), steps: HashMap::new() }
    }
}

impl<V: Clone> StepInputs<V> {
    pub(crate) fn gather(
        sources: &[Source],
        saga_inputs: &HashMap<String, V>,
        results: &HashMap<String, V>,
    ) -> Self {
        let mut bound = Self::default();
        for source in sources {
            match source {
                Source::Input(name) => {
                    if let Some(v) = saga_inputs.get(name) {
                        bound.inputs.insert(name.clone(), v.clone());
                    }
                }
                Source::Step(name) => {
                    if let Some(v) = results.get(name) {
                        bound.steps.insert(name.clone(), v.clone());
                    }
                }
            }
        }
        bound
    }
}

impl<V> StepInputs<V> {
    /// A saga-level input.
    pub fn input(&self, name: &str) -> Option<&V> {
        self.inputs.get(name)
    }

    /// The result of a predecessor step.
    pub fn step(&self, name: &str) -> Option<&V> {
        self.steps.get(name)
    }
}

/// One unit of saga work.
pub struct Step<V, E> {
    pub(crate) name: String,
    pub(crate) sources: Vec<Source>,
    pub(crate) after: Vec<String>,
    pub(crate) action: Action<V, E>,
    pub(crate) compensation: Option<Compensation<V, E>>,
}

impl<V, E> Step<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(StepInputs<V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        Self {
            name: name.into(),
            sources: Vec::new(),
            after: Vec::new(),
            action: Arc::new(move |inputs| Box::pin(action(inputs))),
            compensation: None,
        }
    }

    /// Bind a saga-level input.
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.sources.push(Source::Input(name.into()));
        self
    }

    /// Bind another step's result; implies ordering after that step.
    pub fn uses(mut self, step: impl Into<String>) -> Self {
        self.sources.push(Source::Step(step.into()));
        self
    }

    /// Order after `step` without consuming its result.
    pub fn after(mut self, step: impl Into<String>) -> Self {
        self.after.push(step.into());
        self
    }

    /// Undo action, given this step's result and its original inputs.
    pub fn compensate<F, Fut>(mut self, compensation: F) -> Self
    where
        F: Fn(V, StepInputs<V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.compensation =
            Some(Arc::new(move |output, inputs| Box::pin(compensation(output, inputs))));
        self
    }
}

impl<V, E> Step<V, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps that must complete before this one starts.
    pub fn predecessors(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter_map(|s| match s {
                Source::Step(name) => Some(name.as_str()),
                Source::Input(_) => None,
            })
            .chain(self.after.iter().map(String::as_str))
    }

    pub(crate) fn saga_inputs(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().filter_map(|s| match s {
            Source::Input(name) => Some(name.as_str()),
            Source::Step(_) => None,
        })
    }

    pub fn has_compensation(&self) -> bool {
        self.compensation.is_some()
    }
}

impl<V, E> std::fmt::Debug for Step<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("after", &self.after)
            .field("compensation", &self.compensation.is_some())
            .finish()
    }
}
