//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use vanguard::domain::MissionContext;
use vanguard::domain::models::{
    FailureSnapshot, OrchestratorConfig, Solution, SolutionKind, SolutionStatus, TaskSpec,
};
use vanguard::domain::ports::Solver;
use vanguard::{TaskFailure, TaskOutput, WorkerCapability};

/// Capability that always succeeds, counting invocations.
#[derive(Default)]
pub struct EchoCapability {
    pub calls: AtomicU32,
}

#[async_trait]
impl WorkerCapability for EchoCapability {
    async fn execute(
        &self,
        task: &TaskSpec,
        _ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TaskOutput::with_summary(format!("done: {}", task.task_id)))
    }
}

/// Capability that fails a fixed number of times, then succeeds.
pub struct FlakyCapability {
    failures_left: AtomicU32,
    pub calls: AtomicU32,
}

impl FlakyCapability {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(times),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl WorkerCapability for FlakyCapability {
    async fn execute(
        &self,
        task: &TaskSpec,
        _ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(TaskFailure::execution(format!(
                "transient error in {}",
                task.task_id
            )));
        }
        Ok(TaskOutput::with_summary("recovered"))
    }
}

/// Capability that never succeeds.
#[derive(Default)]
pub struct BrokenCapability {
    pub calls: AtomicU32,
}

#[async_trait]
impl WorkerCapability for BrokenCapability {
    async fn execute(
        &self,
        task: &TaskSpec,
        _ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TaskFailure::execution(format!(
            "permanent error in {}",
            task.task_id
        )))
    }
}

/// Capability that panics instead of returning a failure value.
pub struct PanickyCapability;

#[async_trait]
impl WorkerCapability for PanickyCapability {
    async fn execute(
        &self,
        task: &TaskSpec,
        _ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure> {
        panic!("capability blew up in {}", task.task_id);
    }
}

/// Capability that records the high-water mark of concurrent executions.
pub struct WatermarkCapability {
    running: AtomicUsize,
    pub max_seen: AtomicUsize,
    hold: Duration,
}

impl WatermarkCapability {
    pub fn holding(hold: Duration) -> Self {
        Self {
            running: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
            hold,
        }
    }
}

#[async_trait]
impl WorkerCapability for WatermarkCapability {
    async fn execute(
        &self,
        _task: &TaskSpec,
        _ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(TaskOutput::default())
    }
}

/// Solver that always proposes a valid plan change.
pub struct AlwaysFixSolver;

#[async_trait]
impl Solver for AlwaysFixSolver {
    async fn diagnose(&self, snapshot: &FailureSnapshot) -> Result<Solution> {
        Ok(Solution {
            status: SolutionStatus::SolutionFound,
            solution_kind: SolutionKind::PlanChange,
            solution_value: format!("retry {} with adjusted input", snapshot.task_id),
            confidence: 0.9,
            reasoning: "transient failure pattern".to_string(),
        })
    }
}

pub fn fix_solver() -> Arc<dyn Solver> {
    Arc::new(AlwaysFixSolver)
}

/// Orchestrator config with near-zero backoff so retries do not slow
/// the test suite down.
pub fn fast_config() -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.recovery.initial_backoff_ms = 1;
    config.recovery.max_backoff_ms = 2;
    config
}
