//! Dependency resolution into generations.
//!
//! Converts the `depends_on` relation of a task set into an ordered list
//! of generations. Every prerequisite of a task in generation *k* lies in
//! some generation *< k*; each task sits in the earliest generation its
//! prerequisites allow.
//!
//! # Algorithm
//! Layered topological sort (Kahn). Each round removes every node whose
//! remaining prerequisites are empty; nodes left when no round makes
//! progress form (or depend on) a cycle.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{ForecastError, ForecastResult};
use crate::models::Task;

/// An ordered batch of task ids with all prerequisites in earlier batches.
pub type Generation = BTreeSet<String>;

/// Resolves `task → prerequisites` into generations.
///
/// Prerequisites without an entry of their own are treated as having no
/// prerequisites and land in the first generation.
///
/// # Errors
/// `DependencyCycle` naming every task that could not be ordered.
pub fn resolve_generations(
    dependencies: &BTreeMap<String, BTreeSet<String>>,
) -> ForecastResult<Vec<Generation>> {
    let mut remaining: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (task, prereqs) in dependencies {
        remaining.insert(task.as_str(), prereqs.iter().map(String::as_str).collect());
        for p in prereqs {
            remaining.entry(p.as_str()).or_default();
        }
    }

    let mut generations = Vec::new();
    while !remaining.is_empty() {
        let ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|(_, prereqs)| prereqs.is_empty())
            .map(|(task, _)| *task)
            .collect();

        if ready.is_empty() {
            return Err(ForecastError::DependencyCycle {
                tasks: remaining.keys().map(|t| t.to_string()).collect(),
            });
        }

        remaining.retain(|task, _| !ready.contains(task));
        for prereqs in remaining.values_mut() {
            prereqs.retain(|p| !ready.contains(p));
        }
        generations.push(ready.into_iter().map(str::to_string).collect());
    }

    Ok(generations)
}

/// Plans the generations of a task set.
///
/// Tasks declaring prerequisites go through [`resolve_generations`]; tasks
/// without prerequisites are merged into the first generation. The result
/// always has at least one generation for a non-empty task set.
pub fn plan_generations(tasks: &[Task]) -> ForecastResult<Vec<Generation>> {
    let dependencies: BTreeMap<String, BTreeSet<String>> = tasks
        .iter()
        .filter(|t| t.has_dependencies())
        .map(|t| (t.id.clone(), t.depends_on.iter().cloned().collect()))
        .collect();

    let mut generations = resolve_generations(&dependencies)?;
    let independent = tasks
        .iter()
        .filter(|t| !t.has_dependencies())
        .map(|t| t.id.clone());

    match generations.first_mut() {
        Some(first) => first.extend(independent),
        None => generations.push(independent.collect()),
    }

    debug!(
        generations = generations.len(),
        dependent = dependencies.len(),
        "planned task generations"
    );
    Ok(generations)
}
