//! Recovery coordinator service.
//!
//! Implements the diagnose-fix-retry loop for failed tasks:
//! `Failed -> Diagnosing -> (FixProposed -> Validating -> Retrying) | GivenUp`.
//! Each retry re-executes the task through a caller-supplied attempt
//! function, so the coordinator operates purely on failure values and
//! never reaches into the executor.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::{FailureSnapshot, RecoveryConfig, SystemState, TaskSpec};
use crate::domain::ports::{Solver, TaskFailure, TaskOutput};

/// States of the per-task recovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Failed,
    Diagnosing,
    FixProposed,
    Validating,
    Retrying,
    Recovered,
    GivenUp,
}

/// Outcome of a recovery run for one task.
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    /// Whether any proposed fix passed validation and was applied.
    pub fix_applied: bool,
    /// Whether the task eventually succeeded.
    pub recovered: bool,
    /// Total attempts made, including the initial failed one.
    pub attempts: u32,
    /// Output of the successful retry, when recovered.
    pub output: Option<TaskOutput>,
    /// Last failure observed, preserved when giving up.
    pub last_failure: Option<TaskFailure>,
}

/// Coordinates failure triage and bounded retries.
pub struct RecoveryCoordinator {
    solver: Arc<dyn Solver>,
    config: RecoveryConfig,
    /// Shared executor gauge, read when snapshotting system state.
    in_flight: Arc<AtomicUsize>,
}

impl RecoveryCoordinator {
    pub fn new(
        solver: Arc<dyn Solver>,
        config: RecoveryConfig,
        in_flight: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            solver,
            config,
            in_flight,
        }
    }

    /// Retry budget for a task: its own override or the configured default.
    pub fn budget_for(&self, task: &TaskSpec) -> u32 {
        task.retry_budget.unwrap_or(self.config.default_retry_budget)
    }

    /// Run the diagnose-fix-retry loop after an initial failure.
    ///
    /// `run_attempt` re-executes the task; it receives the attempt
    /// number (the initial failure counts as attempt 1, so retries are
    /// numbered from 2). The loop makes at most `retry_budget` retries.
    /// An invalid or absent solution means "no fix available" and ends
    /// the loop without consuming the remaining budget; it is never
    /// counted as success.
    pub async fn recover<F, Fut>(
        &self,
        mission_id: Uuid,
        task: &TaskSpec,
        first_failure: TaskFailure,
        retry_budget: u32,
        mut run_attempt: F,
    ) -> RecoveryOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<TaskOutput, TaskFailure>>,
    {
        let mut last_failure = first_failure;
        let mut history: Vec<String> = Vec::new();
        let mut fix_applied = false;
        let mut attempts: u32 = 1;

        for retry in 1..=retry_budget {
            // Diagnosing
            let snapshot = FailureSnapshot {
                mission_id,
                task_id: task.task_id.clone(),
                assigned_role: task.assigned_role.clone(),
                error_kind: last_failure.kind,
                error_message: last_failure.message.clone(),
                context: task.description.clone(),
                attempt_history: history.clone(),
                system_state: SystemState {
                    in_flight_tasks: self.in_flight.load(Ordering::SeqCst),
                    retries_used: attempts - 1,
                },
                attempt: attempts,
                captured_at: Utc::now(),
            };

            tracing::debug!(
                task_id = %task.task_id,
                state = ?RecoveryState::Diagnosing,
                attempt = attempts,
                "Requesting diagnosis from solver"
            );
            let solution = match self.solver.diagnose(&snapshot).await {
                Ok(solution) => solution,
                Err(e) => {
                    warn!(
                        task_id = %task.task_id,
                        error = %e,
                        "Solver unavailable, no fix for failed task"
                    );
                    break;
                }
            };

            // Validating: a bad solution is "no fix available", not a crash.
            if let Err(reason) = solution.validate() {
                warn!(
                    task_id = %task.task_id,
                    reason = %reason,
                    "Proposed solution rejected by validation"
                );
                break;
            }

            info!(
                task_id = %task.task_id,
                state = ?RecoveryState::Retrying,
                kind = solution.solution_kind.as_str(),
                confidence = solution.confidence,
                retry,
                "Applying fix and retrying task"
            );
            fix_applied = true;

            // Retrying, after a bounded backoff.
            tokio::time::sleep(self.backoff_delay(retry)).await;
            history.push(last_failure.message.clone());
            attempts += 1;

            match run_attempt(attempts).await {
                Ok(output) => {
                    info!(task_id = %task.task_id, attempts, "Task recovered");
                    return RecoveryOutcome {
                        fix_applied,
                        recovered: true,
                        attempts,
                        output: Some(output),
                        last_failure: None,
                    };
                }
                Err(failure) => {
                    // Loop back to Diagnosing with the new error as context.
                    last_failure = failure;
                }
            }
        }

        // GivenUp: reported, never silently dropped.
        warn!(
            task_id = %task.task_id,
            attempts,
            error = %last_failure,
            "Retry budget exhausted, task permanently failed"
        );
        RecoveryOutcome {
            fix_applied,
            recovered: false,
            attempts,
            output: None,
            last_failure: Some(last_failure),
        }
    }

    /// Exponential delay: `initial * 2^(retry-1)`, capped.
    fn backoff_delay(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let ms = self
            .config
            .initial_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.config.max_backoff_ms);
        Duration::from_millis(ms)
    }
}
