// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition checks: unique names, known dependencies, no cycles.

use std::collections::{HashMap, HashSet};

use crate::error::DefinitionError;
use crate::step::Step;

pub(crate) fn validate<V, E>(steps: &[Step<V, E>], terminal: &str) -> Result<(), DefinitionError> {
    if steps.is_empty() {
        return Err(DefinitionError::Empty);
    }

    let mut names = HashSet::new();
    for step in steps {
        if !names.insert(step.name.as_str()) {
            return Err(DefinitionError::DuplicateStep(step.name.clone()));
        }
    }

    for step in steps {
        for dep in step.predecessors() {
            if !names.contains(dep) {
                return Err(DefinitionError::UnknownDependency {
                    step: step.name.clone(),
                    dependency: dep.to_string(),
                });
            }
        }
    }

    if !names.contains(terminal) {
        return Err(DefinitionError::UnknownTerminal(terminal.to_string()));
    }

    // Kahn's algorithm; whatever cannot be peeled off sits on a cycle.
    let mut indegree: HashMap<&str, usize> = steps
        .iter()
        .map(|s| (s.name.as_str(), s.predecessors().collect::<HashSet<_>>().len()))
        .collect();
    let mut ready: Vec<&str> =
        indegree.iter().filter(|(_, d)| **d == 0).map(|(n, _)| *n).collect();
    let mut visited = 0;
    while let Some(name) = ready.pop() {
        visited += 1;
        for step in steps {
            if step.predecessors().collect::<HashSet<_>>().contains(name) {
                if let Some(d) = indegree.get_mut(step.name.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(step.name.as_str());
                    }
                }
            }
        }
    }

    if visited < steps.len() {
        let mut cycle: Vec<String> = indegree
            .into_iter()
            .filter(|(_, d)| *d > 0)
            .map(|(n, _)| n.to_string())
            .collect();
        cycle.sort();
        return Err(DefinitionError::Cycle(cycle));
    }

    Ok(())
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
