//! Solver port - interface for failure diagnosis backends.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{FailureSnapshot, Solution, SolutionKind, SolutionStatus};

/// Trait for pluggable failure solvers.
///
/// The recovery coordinator hands the solver a failure snapshot and
/// expects a `Solution` back. Transport or backend errors are treated
/// downstream as "no fix available", never as mission faults.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Diagnose a failure and propose a fix.
    async fn diagnose(&self, snapshot: &FailureSnapshot) -> Result<Solution>;
}

/// A solver that never finds a fix.
///
/// Use this when automated recovery is disabled: failed tasks go
/// straight to their final failed state after the first attempt.
#[derive(Debug, Clone, Default)]
pub struct NullSolver;

impl NullSolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Solver for NullSolver {
    async fn diagnose(&self, _snapshot: &FailureSnapshot) -> Result<Solution> {
        Ok(Solution {
            status: SolutionStatus::NoSolution,
            solution_kind: SolutionKind::SystemFix,
            solution_value: String::new(),
            confidence: 0.0,
            reasoning: "automated recovery disabled".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FailureKind;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_null_solver_never_proposes_a_fix() {
        let snapshot = FailureSnapshot {
            mission_id: Uuid::new_v4(),
            task_id: "t1".to_string(),
            assigned_role: "worker".to_string(),
            error_kind: FailureKind::Execution,
            error_message: "boom".to_string(),
            context: String::new(),
            attempt_history: vec![],
            system_state: crate::domain::models::SystemState::default(),
            attempt: 1,
            captured_at: Utc::now(),
        };

        let solution = NullSolver::new().diagnose(&snapshot).await.unwrap();
        assert!(solution.validate().is_err());
    }
}
