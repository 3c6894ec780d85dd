//! Phase scheduler service.
//!
//! Drives one blueprint phase: resolves tasks into dependency-ordered
//! groups, runs each group under the mission's concurrency bound, and
//! hands failures to the recovery coordinator. A critical task's
//! permanent failure raises the cancellation flag; tasks that have not
//! started yet are skipped, already-running tasks finish.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{MissionContext, MissionStatus, Phase, TaskSpec};
use crate::services::dependency_resolver::DependencyResolver;
use crate::services::recovery_coordinator::RecoveryCoordinator;
use crate::services::task_executor::TaskExecutor;

/// Event emitted during mission execution.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// Mission accepted and starting.
    MissionStarted {
        mission_id: Uuid,
        total_tasks: usize,
        phase_count: usize,
    },
    /// Phase starting with resolved groups.
    PhaseStarted {
        phase_id: String,
        task_count: usize,
        group_count: usize,
    },
    /// Task picked up for its first attempt.
    TaskStarted { task_id: String },
    /// Task retrying after a validated fix.
    TaskRetrying {
        task_id: String,
        attempt: u32,
        max_attempts: u32,
    },
    /// Task finished successfully.
    TaskCompleted { task_id: String, attempts: u32 },
    /// Task permanently failed.
    TaskFailed {
        task_id: String,
        error: String,
        attempts: u32,
    },
    /// Task never started because the mission was cancelled.
    TaskSkipped { task_id: String },
    /// Phase finished.
    PhaseCompleted {
        phase_id: String,
        completed: usize,
        failed: usize,
        skipped: usize,
    },
    /// Mission finished.
    MissionCompleted {
        mission_id: Uuid,
        status: MissionStatus,
        success_rate: f64,
    },
}

/// Final verdict for one task within a mission.
#[derive(Debug, Clone)]
pub struct TaskVerdict {
    pub task_id: String,
    pub succeeded: bool,
    pub skipped: bool,
    /// Total attempts, including the initial one; 0 when skipped or
    /// satisfied from the ledger.
    pub attempts: u32,
    /// Last error for permanently failed tasks.
    pub error: Option<String>,
    pub critical: bool,
}

impl TaskVerdict {
    fn completed(task_id: String, attempts: u32, critical: bool) -> Self {
        Self {
            task_id,
            succeeded: true,
            skipped: false,
            attempts,
            error: None,
            critical,
        }
    }

    fn failed(task_id: String, attempts: u32, error: String, critical: bool) -> Self {
        Self {
            task_id,
            succeeded: false,
            skipped: false,
            attempts,
            error: Some(error),
            critical,
        }
    }

    pub(crate) fn skipped(task_id: String, critical: bool) -> Self {
        Self {
            task_id,
            succeeded: false,
            skipped: true,
            attempts: 0,
            error: None,
            critical,
        }
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub verdicts: Vec<TaskVerdict>,
}

impl PhaseOutcome {
    fn from_verdicts(verdicts: Vec<TaskVerdict>) -> Self {
        let completed = verdicts.iter().filter(|v| v.succeeded).count();
        let skipped = verdicts.iter().filter(|v| v.skipped).count();
        let failed = verdicts.len() - completed - skipped;
        Self {
            completed,
            failed,
            skipped,
            verdicts,
        }
    }

    /// IDs of tasks that completed in this phase.
    pub fn completed_ids(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .iter()
            .filter(|v| v.succeeded)
            .map(|v| v.task_id.as_str())
    }
}

/// Schedules the groups of a phase under a concurrency bound.
pub struct PhaseScheduler {
    executor: Arc<TaskExecutor>,
    recovery: Arc<RecoveryCoordinator>,
    resolver: DependencyResolver,
}

impl PhaseScheduler {
    pub fn new(executor: Arc<TaskExecutor>, recovery: Arc<RecoveryCoordinator>) -> Self {
        Self {
            executor,
            recovery,
            resolver: DependencyResolver::new(),
        }
    }

    /// Execute one phase.
    ///
    /// `satisfied` carries task IDs completed in earlier phases.
    /// `cancel` is the mission-wide cancellation flag; this method
    /// raises it when a critical task permanently fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute_phase(
        &self,
        mission_id: Uuid,
        phase: &Phase,
        concurrency_limit: usize,
        satisfied: &HashSet<String>,
        ctx: &MissionContext,
        cancel: &watch::Sender<bool>,
        event_tx: &mpsc::Sender<ExecutionEvent>,
    ) -> OrchestratorResult<PhaseOutcome> {
        let groups = self.resolver.resolve(&phase.tasks, satisfied)?;
        let task_map: HashMap<&str, &TaskSpec> = phase
            .tasks
            .iter()
            .map(|t| (t.task_id.as_str(), t))
            .collect();

        let _ = event_tx
            .send(ExecutionEvent::PhaseStarted {
                phase_id: phase.phase_id.clone(),
                task_count: phase.tasks.len(),
                group_count: groups.len(),
            })
            .await;
        info!(
            phase_id = %phase.phase_id,
            tasks = phase.tasks.len(),
            groups = groups.len(),
            "Starting phase"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency_limit));
        let mut verdicts: Vec<TaskVerdict> = Vec::new();

        for (group_idx, group) in groups.iter().enumerate() {
            if *cancel.subscribe().borrow() {
                // Mission cancelled; everything not yet started is skipped.
                for task_id in groups[group_idx..].iter().flatten() {
                    let critical = task_map.get(task_id.as_str()).is_some_and(|t| t.critical);
                    let _ = event_tx
                        .send(ExecutionEvent::TaskSkipped {
                            task_id: task_id.clone(),
                        })
                        .await;
                    verdicts.push(TaskVerdict::skipped(task_id.clone(), critical));
                }
                break;
            }

            let mut handles = Vec::with_capacity(group.len());
            for task_id in group {
                let task = match task_map.get(task_id.as_str()) {
                    Some(t) => (*t).clone(),
                    None => continue,
                };
                let critical = task.critical;
                let handle = tokio::spawn(self.task_future(
                    mission_id,
                    task,
                    ctx.clone(),
                    semaphore.clone(),
                    cancel.clone(),
                    event_tx.clone(),
                ));
                handles.push((task_id.clone(), critical, handle));
            }

            // Group barrier: every task observes completion independently,
            // but the next group only starts once this one has resolved.
            for (task_id, critical, handle) in handles {
                match handle.await {
                    Ok(verdict) => verdicts.push(verdict),
                    Err(e) => {
                        // A panicking capability still counts as a
                        // permanent failure; nothing vanishes from the
                        // final report.
                        error!(task_id = %task_id, error = %e, "Task execution panicked");
                        let error = format!("task panicked: {e}");
                        let _ = event_tx
                            .send(ExecutionEvent::TaskFailed {
                                task_id: task_id.clone(),
                                error: error.clone(),
                                attempts: 0,
                            })
                            .await;
                        if critical {
                            let _ = cancel.send(true);
                        }
                        verdicts.push(TaskVerdict::failed(task_id, 0, error, critical));
                    }
                }
            }
        }

        let outcome = PhaseOutcome::from_verdicts(verdicts);
        let _ = event_tx
            .send(ExecutionEvent::PhaseCompleted {
                phase_id: phase.phase_id.clone(),
                completed: outcome.completed,
                failed: outcome.failed,
                skipped: outcome.skipped,
            })
            .await;
        info!(
            phase_id = %phase.phase_id,
            completed = outcome.completed,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "Phase finished"
        );

        Ok(outcome)
    }

    /// Build the future executing one task to its final verdict.
    fn task_future(
        &self,
        mission_id: Uuid,
        task: TaskSpec,
        ctx: MissionContext,
        semaphore: Arc<Semaphore>,
        cancel: watch::Sender<bool>,
        event_tx: mpsc::Sender<ExecutionEvent>,
    ) -> impl Future<Output = TaskVerdict> + Send + 'static {
        let executor = self.executor.clone();
        let recovery = self.recovery.clone();

        async move {
            let cancelled = || *cancel.subscribe().borrow();

            // The admission gate: at most `concurrency_limit` tasks run
            // at once; the rest queue here.
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return TaskVerdict::failed(
                        task.task_id.clone(),
                        0,
                        "concurrency gate closed".to_string(),
                        task.critical,
                    )
                }
            };
            let _permit = permit;

            if cancelled() {
                let _ = event_tx
                    .send(ExecutionEvent::TaskSkipped {
                        task_id: task.task_id.clone(),
                    })
                    .await;
                return TaskVerdict::skipped(task.task_id.clone(), task.critical);
            }

            // Idempotency: a task completed by an earlier run of the
            // same mission is not re-executed.
            if executor.already_completed(mission_id, &task.task_id).await {
                info!(task_id = %task.task_id, "Task already completed in ledger, skipping");
                return TaskVerdict::completed(task.task_id.clone(), 0, task.critical);
            }

            let _ = event_tx
                .send(ExecutionEvent::TaskStarted {
                    task_id: task.task_id.clone(),
                })
                .await;

            match executor.run_attempt(mission_id, &task, &ctx, 1).await {
                Ok(_) => {
                    let _ = event_tx
                        .send(ExecutionEvent::TaskCompleted {
                            task_id: task.task_id.clone(),
                            attempts: 1,
                        })
                        .await;
                    TaskVerdict::completed(task.task_id.clone(), 1, task.critical)
                }
                Err(first_failure) => {
                    let budget = recovery.budget_for(&task);
                    let outcome = recovery
                        .recover(mission_id, &task, first_failure, budget, |attempt| {
                            let executor = executor.clone();
                            let task = task.clone();
                            let ctx = ctx.clone();
                            let event_tx = event_tx.clone();
                            async move {
                                let _ = event_tx
                                    .send(ExecutionEvent::TaskRetrying {
                                        task_id: task.task_id.clone(),
                                        attempt,
                                        max_attempts: budget + 1,
                                    })
                                    .await;
                                executor.run_attempt(mission_id, &task, &ctx, attempt).await
                            }
                        })
                        .await;

                    if outcome.recovered {
                        let _ = event_tx
                            .send(ExecutionEvent::TaskCompleted {
                                task_id: task.task_id.clone(),
                                attempts: outcome.attempts,
                            })
                            .await;
                        return TaskVerdict::completed(
                            task.task_id.clone(),
                            outcome.attempts,
                            task.critical,
                        );
                    }

                    let error = outcome
                        .last_failure
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "unknown failure".to_string());
                    let _ = event_tx
                        .send(ExecutionEvent::TaskFailed {
                            task_id: task.task_id.clone(),
                            error: error.clone(),
                            attempts: outcome.attempts,
                        })
                        .await;

                    if task.critical {
                        warn!(
                            task_id = %task.task_id,
                            "Critical task permanently failed, cancelling mission"
                        );
                        let _ = cancel.send(true);
                    }

                    TaskVerdict::failed(task.task_id.clone(), outcome.attempts, error, task.critical)
                }
            }
        }
    }
}
