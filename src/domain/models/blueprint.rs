//! Blueprint domain model.
//!
//! A blueprint is the validated execution plan for a mission: ordered
//! phases, each holding tasks with dependencies, plus a concurrency
//! policy. Blueprints are produced by an upstream planning step and
//! consumed read-only by the orchestrator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{MissionError, OrchestratorResult};
use crate::domain::ports::CapabilityRegistry;

/// Concurrency policy for a mission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcurrencyPolicy {
    /// Maximum tasks running at the same time within a phase. When the
    /// planning document sets no bound, the configured executor default
    /// applies.
    #[serde(default)]
    pub max_concurrent_tasks: Option<usize>,
}

/// A single task within a blueprint phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Unique identifier within the blueprint.
    pub task_id: String,
    /// Human-readable name.
    pub task_name: String,
    /// Worker role this task is delegated to.
    #[serde(alias = "assignedAgent")]
    pub assigned_role: String,
    /// Detailed instructions for the worker capability.
    #[serde(default)]
    pub description: String,
    /// Task IDs this task depends on (same phase or earlier phases only).
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Planner's duration estimate, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_ms: Option<u64>,
    /// Per-task retry budget override for the recovery coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_budget: Option<u32>,
    /// Whether permanent failure of this task halts the whole mission.
    #[serde(default)]
    pub critical: bool,
}

impl TaskSpec {
    /// Create a minimal task spec. Mostly useful in tests and demos.
    pub fn new(
        task_id: impl Into<String>,
        task_name: impl Into<String>,
        assigned_role: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            assigned_role: assigned_role.into(),
            description: String::new(),
            dependencies: Vec::new(),
            estimated_duration_ms: None,
            retry_budget: None,
            critical: false,
        }
    }

    /// Add a dependency on another task.
    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        let dep = task_id.into();
        if dep != self.task_id && !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
        self
    }

    /// Override the retry budget.
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = Some(budget);
        self
    }

    /// Mark this task as critical.
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

/// A sequential stage of a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Identifier, unique within the blueprint.
    pub phase_id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: String,
    /// Tasks in declaration order.
    pub tasks: Vec<TaskSpec>,
}

impl Phase {
    pub fn new(phase_id: impl Into<String>, tasks: Vec<TaskSpec>) -> Self {
        let phase_id = phase_id.into();
        Self {
            name: phase_id.clone(),
            phase_id,
            tasks,
        }
    }
}

/// The validated execution plan consumed by the orchestrator.
///
/// Immutable once validated; the orchestrator never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Mission identity, generated at acceptance time.
    pub mission_id: Uuid,
    /// Summary of what the mission is trying to achieve.
    #[serde(default)]
    pub mission_overview: String,
    /// Ordered phases; phases execute strictly sequentially.
    pub phases: Vec<Phase>,
    /// Concurrency bound for task execution.
    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,
}

/// External planning document shape, as produced by the planning step.
///
/// Parsed strictly: missing required task fields reject the whole
/// document rather than executing it partially.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlueprintDocument {
    #[serde(default)]
    mission_overview: String,
    execution_phases: Vec<Phase>,
    #[serde(default)]
    execution_strategy: ConcurrencyPolicy,
}

impl Blueprint {
    /// Build a blueprint directly from phases. Used by tests and
    /// callers that already hold structured plans.
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            mission_id: Uuid::new_v4(),
            mission_overview: String::new(),
            phases,
            concurrency: ConcurrencyPolicy::default(),
        }
    }

    /// Set the mission overview.
    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.mission_overview = overview.into();
        self
    }

    /// Set an explicit concurrency bound.
    pub fn with_max_concurrent_tasks(mut self, max: usize) -> Self {
        self.concurrency.max_concurrent_tasks = Some(max);
        self
    }

    /// Parse a planning document from JSON.
    ///
    /// Schema violations (missing `taskId`, `assignedRole`/`assignedAgent`,
    /// `taskName`) reject the document wholesale with
    /// [`MissionError::BlueprintInvalid`].
    pub fn from_planning_document(json: &str) -> OrchestratorResult<Self> {
        let doc: BlueprintDocument = serde_json::from_str(json)
            .map_err(|e| MissionError::BlueprintInvalid(e.to_string()))?;

        Ok(Self {
            mission_id: Uuid::new_v4(),
            mission_overview: doc.mission_overview,
            phases: doc.execution_phases,
            concurrency: doc.execution_strategy,
        })
    }

    /// Iterate over all tasks across phases in declaration order.
    pub fn all_tasks(&self) -> impl Iterator<Item = &TaskSpec> {
        self.phases.iter().flat_map(|p| p.tasks.iter())
    }

    /// Total number of tasks across all phases.
    pub fn total_tasks(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    /// Validate blueprint structure against the capability registry.
    ///
    /// Checks, in order: concurrency bound is positive, task IDs are
    /// unique across the blueprint, no task depends on itself, no task
    /// references a dependency declared in a *later* phase, and every
    /// assigned role is registered. Unknown roles fail here rather than
    /// at execution time.
    pub fn validate(&self, registry: &CapabilityRegistry) -> OrchestratorResult<()> {
        if self.concurrency.max_concurrent_tasks == Some(0) {
            return Err(MissionError::BlueprintInvalid(
                "maxConcurrentTasks must be at least 1".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for task in self.all_tasks() {
            if task.task_id.trim().is_empty() {
                return Err(MissionError::BlueprintInvalid(
                    "task with empty taskId".to_string(),
                ));
            }
            if !seen.insert(task.task_id.as_str()) {
                return Err(MissionError::BlueprintInvalid(format!(
                    "duplicate taskId '{}'",
                    task.task_id
                )));
            }
        }

        // Dependencies may only reference the same phase or earlier ones.
        let mut visible: HashSet<&str> = HashSet::new();
        for phase in &self.phases {
            for task in &phase.tasks {
                visible.insert(task.task_id.as_str());
            }
            for task in &phase.tasks {
                for dep in &task.dependencies {
                    if dep == &task.task_id {
                        return Err(MissionError::BlueprintInvalid(format!(
                            "task '{}' depends on itself",
                            task.task_id
                        )));
                    }
                    if !visible.contains(dep.as_str()) {
                        if seen.contains(dep.as_str()) {
                            return Err(MissionError::BlueprintInvalid(format!(
                                "task '{}' references dependency '{}' declared in a later phase",
                                task.task_id, dep
                            )));
                        }
                        return Err(MissionError::DanglingDependency {
                            task_id: task.task_id.clone(),
                            dependency: dep.clone(),
                        });
                    }
                }
            }
        }

        for task in self.all_tasks() {
            if !registry.contains(&task.assigned_role) {
                return Err(MissionError::UnknownRole {
                    task_id: task.task_id.clone(),
                    role: task.assigned_role.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CapabilityRegistry, TaskFailure, TaskOutput, WorkerCapability};
    use crate::domain::MissionContext;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopCapability;

    #[async_trait]
    impl WorkerCapability for NoopCapability {
        async fn execute(
            &self,
            _task: &TaskSpec,
            _ctx: &MissionContext,
        ) -> Result<TaskOutput, TaskFailure> {
            Ok(TaskOutput::default())
        }
    }

    fn registry_with(roles: &[&str]) -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        for role in roles {
            registry.register(*role, Arc::new(NoopCapability));
        }
        registry
    }

    #[test]
    fn test_parse_planning_document() {
        let json = r#"{
            "missionOverview": "Ship the login feature",
            "executionPhases": [
                {
                    "phaseId": "p1",
                    "tasks": [
                        {"taskId": "a", "taskName": "Design schema", "assignedAgent": "architect"},
                        {"taskId": "b", "taskName": "Implement", "assignedRole": "developer",
                         "dependencies": ["a"], "critical": true}
                    ]
                }
            ],
            "executionStrategy": {"maxConcurrentTasks": 2}
        }"#;

        let blueprint = Blueprint::from_planning_document(json).unwrap();
        assert_eq!(blueprint.mission_overview, "Ship the login feature");
        assert_eq!(blueprint.concurrency.max_concurrent_tasks, Some(2));
        assert_eq!(blueprint.total_tasks(), 2);

        let b = &blueprint.phases[0].tasks[1];
        assert_eq!(b.assigned_role, "developer");
        assert_eq!(b.dependencies, vec!["a".to_string()]);
        assert!(b.critical);
    }

    #[test]
    fn test_parse_rejects_missing_required_fields() {
        // Task without assignedRole/assignedAgent
        let json = r#"{
            "executionPhases": [
                {"phaseId": "p1", "tasks": [{"taskId": "a", "taskName": "Orphan"}]}
            ]
        }"#;
        let err = Blueprint::from_planning_document(json).unwrap_err();
        assert!(matches!(err, MissionError::BlueprintInvalid(_)));
    }

    #[test]
    fn test_parse_without_strategy_leaves_bound_unset() {
        let json = r#"{
            "executionPhases": [
                {"phaseId": "p1", "tasks": [{"taskId": "a", "taskName": "Solo", "assignedRole": "worker"}]}
            ]
        }"#;
        let blueprint = Blueprint::from_planning_document(json).unwrap();
        assert_eq!(blueprint.concurrency.max_concurrent_tasks, None);
        assert!(blueprint.validate(&registry_with(&["worker"])).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_rejected() {
        let blueprint = Blueprint::new(vec![Phase::new(
            "p1",
            vec![TaskSpec::new("a", "First", "worker")],
        )])
        .with_max_concurrent_tasks(0);
        let err = blueprint.validate(&registry_with(&["worker"])).unwrap_err();
        assert!(matches!(err, MissionError::BlueprintInvalid(_)));
    }

    #[test]
    fn test_validate_duplicate_task_ids() {
        let blueprint = Blueprint::new(vec![Phase::new(
            "p1",
            vec![
                TaskSpec::new("a", "First", "worker"),
                TaskSpec::new("a", "Clone", "worker"),
            ],
        )]);
        let err = blueprint.validate(&registry_with(&["worker"])).unwrap_err();
        assert!(matches!(err, MissionError::BlueprintInvalid(_)));
    }

    #[test]
    fn test_validate_forward_reference_rejected() {
        let blueprint = Blueprint::new(vec![
            Phase::new(
                "p1",
                vec![TaskSpec::new("a", "First", "worker").with_dependency("later")],
            ),
            Phase::new("p2", vec![TaskSpec::new("later", "Second", "worker")]),
        ]);
        let err = blueprint.validate(&registry_with(&["worker"])).unwrap_err();
        assert!(matches!(err, MissionError::BlueprintInvalid(_)));
    }

    #[test]
    fn test_validate_dangling_dependency() {
        let blueprint = Blueprint::new(vec![Phase::new(
            "p1",
            vec![TaskSpec::new("a", "First", "worker").with_dependency("ghost")],
        )]);
        let err = blueprint.validate(&registry_with(&["worker"])).unwrap_err();
        assert!(matches!(err, MissionError::DanglingDependency { .. }));
    }

    #[test]
    fn test_validate_unknown_role() {
        let blueprint = Blueprint::new(vec![Phase::new(
            "p1",
            vec![TaskSpec::new("a", "First", "mystery")],
        )]);
        let err = blueprint.validate(&registry_with(&["worker"])).unwrap_err();
        assert!(matches!(err, MissionError::UnknownRole { .. }));
    }

    #[test]
    fn test_validate_cross_phase_dependency_allowed() {
        let blueprint = Blueprint::new(vec![
            Phase::new("p1", vec![TaskSpec::new("a", "First", "worker")]),
            Phase::new(
                "p2",
                vec![TaskSpec::new("b", "Second", "worker").with_dependency("a")],
            ),
        ]);
        assert!(blueprint.validate(&registry_with(&["worker"])).is_ok());
    }

    #[test]
    fn test_self_dependency_ignored_by_builder() {
        let task = TaskSpec::new("a", "Task", "worker").with_dependency("a");
        assert!(task.dependencies.is_empty());
    }
}
