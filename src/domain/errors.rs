//! Domain errors for the mission orchestrator.

use thiserror::Error;

/// Format a cycle path as a human-readable string: `A -> B -> C -> A`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Errors that can abort a mission before or during orchestration.
///
/// Structural errors (cycles, dangling dependencies, schema violations,
/// unknown roles) surface before any task runs. Per-task failures are
/// absorbed by the recovery coordinator and reported through the final
/// `MissionReport` instead of this type.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("Request rejected by pre-flight gate: {feedback}")]
    GateRejected { feedback: String },

    #[error("Task dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<String>),

    #[error("Task '{task_id}' depends on unknown task '{dependency}'")]
    DanglingDependency { task_id: String, dependency: String },

    #[error("Blueprint validation failed: {0}")]
    BlueprintInvalid(String),

    #[error("Task '{task_id}' is assigned to unknown role '{role}'")]
    UnknownRole { task_id: String, role: String },

    #[error("Ledger write failed: {0}")]
    LedgerError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type OrchestratorResult<T> = Result<T, MissionError>;

impl From<serde_json::Error> for MissionError {
    fn from(err: serde_json::Error) -> Self {
        MissionError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_names_path() {
        let err = MissionError::DependencyCycle(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Task dependency cycle detected: a -> b -> a"
        );
    }

    #[test]
    fn test_dangling_dependency_display() {
        let err = MissionError::DanglingDependency {
            task_id: "build".to_string(),
            dependency: "missing".to_string(),
        };
        assert!(err.to_string().contains("build"));
        assert!(err.to_string().contains("missing"));
    }
}
