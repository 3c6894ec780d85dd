//! Task executor service.
//!
//! Runs one task attempt against the worker capability registered for
//! its role, under a timeout, appending a ledger record for every
//! state transition. Failures are returned as typed values; nothing
//! here uses errors for control flow across component boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::{ExecutorConfig, MissionContext, TaskExecutionRecord, TaskSpec, TaskState};
use crate::domain::ports::{CapabilityRegistry, Ledger, TaskFailure, TaskOutput};

/// Executes single task attempts.
pub struct TaskExecutor {
    registry: Arc<CapabilityRegistry>,
    ledger: Arc<dyn Ledger>,
    config: ExecutorConfig,
    in_flight: Arc<AtomicUsize>,
}

impl TaskExecutor {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        ledger: Arc<dyn Ledger>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            config,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Gauge counting attempts currently executing. Shared with the
    /// recovery coordinator so failure snapshots carry resource state.
    pub fn in_flight_gauge(&self) -> Arc<AtomicUsize> {
        self.in_flight.clone()
    }

    /// Run one attempt of a task.
    ///
    /// Appends pending, running, and terminal records for the attempt.
    /// The attempt number is carried on every record so the full retry
    /// history stays auditable.
    pub async fn run_attempt(
        &self,
        mission_id: Uuid,
        task: &TaskSpec,
        ctx: &MissionContext,
        attempt: u32,
    ) -> Result<TaskOutput, TaskFailure> {
        let submitted = TaskExecutionRecord::submitted(mission_id, &task.task_id, attempt);
        self.append(&submitted).await;

        // Validation rejects unknown roles before execution; a miss
        // here means the registry changed underneath us.
        let Some(capability) = self.registry.resolve(&task.assigned_role) else {
            let failure =
                TaskFailure::capability(format!("no capability for role '{}'", task.assigned_role));
            self.append(&submitted.failed(failure.to_string())).await;
            return Err(failure);
        };

        self.append(&submitted.advanced(TaskState::Running)).await;
        debug!(
            task_id = %task.task_id,
            role = %task.assigned_role,
            attempt,
            "Executing task"
        );

        let deadline = Duration::from_secs(self.config.task_timeout_secs);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let attempt_result = timeout(deadline, capability.execute(task, ctx)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match attempt_result {
            Ok(Ok(output)) => {
                self.append(&submitted.advanced(TaskState::Completed)).await;
                Ok(output)
            }
            Ok(Err(failure)) => {
                self.append(&submitted.failed(failure.to_string())).await;
                Err(failure)
            }
            Err(_) => {
                let failure = TaskFailure::timeout(format!(
                    "task timed out after {} seconds",
                    self.config.task_timeout_secs
                ));
                self.append(&submitted.failed(failure.to_string())).await;
                Err(failure)
            }
        }
    }

    /// Consult the ledger for idempotency: has this task already
    /// completed in this mission?
    pub async fn already_completed(&self, mission_id: Uuid, task_id: &str) -> bool {
        match self.ledger.was_completed(mission_id, task_id).await {
            Ok(done) => done,
            Err(e) => {
                warn!(task_id, error = %e, "Ledger idempotency check failed, assuming not completed");
                false
            }
        }
    }

    /// Append a transition record; ledger write failures degrade to a
    /// warning rather than failing the task.
    async fn append(&self, record: &TaskExecutionRecord) {
        if let Err(e) = self.ledger.record_transition(record).await {
            warn!(
                task_id = %record.task_id,
                status = record.status.as_str(),
                error = %e,
                "Failed to append execution record"
            );
        }
    }
}
