//! Dependency resolver service.
//!
//! Converts a task dependency map into ordered execution groups
//! (topological layers): each group may execute concurrently, groups
//! execute strictly in sequence. Detects cycles and dangling
//! dependencies before any grouping is returned.

use std::collections::{HashMap, HashSet};

use crate::domain::errors::{MissionError, OrchestratorResult};
use crate::domain::models::TaskSpec;

/// Service for resolving task dependencies into execution groups.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve tasks into ordered groups of task IDs.
    ///
    /// `satisfied` holds task IDs completed in earlier phases; those
    /// dependencies count as already met. Group N contains every task
    /// whose remaining dependencies all sit in groups before N; ties
    /// are broken by declaration order, so the output is deterministic.
    ///
    /// Fails fast with [`MissionError::DanglingDependency`] when a
    /// dependency references no known task, and with
    /// [`MissionError::DependencyCycle`] on circular dependencies;
    /// no partial grouping is ever returned.
    pub fn resolve(
        &self,
        tasks: &[TaskSpec],
        satisfied: &HashSet<String>,
    ) -> OrchestratorResult<Vec<Vec<String>>> {
        let known: HashSet<&str> = tasks.iter().map(|t| t.task_id.as_str()).collect();

        for task in tasks {
            for dep in &task.dependencies {
                if !known.contains(dep.as_str()) && !satisfied.contains(dep) {
                    return Err(MissionError::DanglingDependency {
                        task_id: task.task_id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.detect_cycle(tasks) {
            return Err(MissionError::DependencyCycle(cycle));
        }

        // Layered grouping: place a task as soon as every dependency
        // has landed in an earlier group. Declaration order is kept
        // within each group.
        let mut placed: HashSet<String> = satisfied.clone();
        let mut remaining: Vec<&TaskSpec> = tasks.iter().collect();
        let mut groups: Vec<Vec<String>> = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&TaskSpec>, Vec<&TaskSpec>) = remaining
                .into_iter()
                .partition(|t| t.dependencies.iter().all(|d| placed.contains(d)));

            // Cycle detection above guarantees progress.
            debug_assert!(!ready.is_empty());
            if ready.is_empty() {
                let stuck: Vec<String> =
                    blocked.iter().map(|t| t.task_id.clone()).collect();
                return Err(MissionError::DependencyCycle(stuck));
            }

            for task in &ready {
                placed.insert(task.task_id.clone());
            }
            groups.push(ready.into_iter().map(|t| t.task_id.clone()).collect());
            remaining = blocked;
        }

        Ok(groups)
    }

    /// Detect circular dependencies among the given tasks.
    ///
    /// Depth-first search with a temporarily-visiting marker set;
    /// re-entering a task on the current path signals a cycle. Returns
    /// the offending path when one exists.
    pub fn detect_cycle(&self, tasks: &[TaskSpec]) -> Option<Vec<String>> {
        let graph: HashMap<&str, &[String]> = tasks
            .iter()
            .map(|t| (t.task_id.as_str(), t.dependencies.as_slice()))
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut visiting: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();

        for task in tasks {
            if !visited.contains(task.task_id.as_str())
                && visit(task.task_id.as_str(), &graph, &mut visited, &mut visiting, &mut path)
            {
                let mut cycle: Vec<String> = path.iter().map(|s| (*s).to_string()).collect();
                // Close the loop for readability: a -> b -> a
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                return Some(cycle);
            }
        }

        None
    }
}

fn visit<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    visiting: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> bool {
    visited.insert(node);
    visiting.insert(node);
    path.push(node);

    if let Some(deps) = graph.get(node) {
        for dep in deps.iter() {
            let dep = dep.as_str();
            // Dependencies on tasks outside this set (earlier phases)
            // cannot participate in a cycle within it.
            if !graph.contains_key(dep) {
                continue;
            }
            if visiting.contains(dep) {
                if let Some(start) = path.iter().position(|&n| n == dep) {
                    path.drain(0..start);
                }
                return true;
            }
            if !visited.contains(dep) && visit(dep, graph, visited, visiting, path) {
                return true;
            }
        }
    }

    visiting.remove(node);
    path.pop();
    false
}
