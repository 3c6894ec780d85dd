//! Orchestrator session: the end-to-end mission use case.
//!
//! A session owns its capability registry, solver, ledger handle, and
//! configuration; there are no process-wide singletons. Data flow:
//! pre-flight gate -> blueprint validation -> per-phase resolution and
//! scheduling -> aggregation -> ledger outcome write.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::domain::errors::{MissionError, OrchestratorResult};
use crate::domain::models::{
    Blueprint, GateDecision, MissionContext, MissionReport, OrchestratorConfig,
};
use crate::domain::ports::{CapabilityRegistry, Ledger, Solver};
use crate::services::phase_scheduler::{ExecutionEvent, PhaseScheduler, TaskVerdict};
use crate::services::{
    MissionAggregator, PreflightGate, RecoveryCoordinator, TaskExecutor,
};

/// Coordinates a full mission run.
pub struct OrchestratorSession {
    registry: Arc<CapabilityRegistry>,
    ledger: Arc<dyn Ledger>,
    gate: PreflightGate,
    scheduler: PhaseScheduler,
    aggregator: MissionAggregator,
    config: OrchestratorConfig,
}

impl OrchestratorSession {
    pub fn new(
        registry: CapabilityRegistry,
        solver: Arc<dyn Solver>,
        ledger: Arc<dyn Ledger>,
        config: OrchestratorConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let executor = Arc::new(TaskExecutor::new(
            registry.clone(),
            ledger.clone(),
            config.executor.clone(),
        ));
        let recovery = Arc::new(RecoveryCoordinator::new(
            solver,
            config.recovery.clone(),
            executor.in_flight_gauge(),
        ));

        Self {
            registry: registry.clone(),
            ledger,
            gate: PreflightGate::new(config.gate.clone()),
            scheduler: PhaseScheduler::new(executor, recovery),
            aggregator: MissionAggregator::new(config.aggregator.clone()),
            config,
        }
    }

    /// Evaluate a raw request against the pre-flight gate.
    ///
    /// Callers must check `go_no_go` before running a mission for the
    /// request; [`run_gated_mission`](Self::run_gated_mission) does
    /// both in one step.
    pub fn evaluate_request(&self, request: &str) -> GateDecision {
        self.gate.evaluate(request)
    }

    /// Gate a request, then run the blueprint if approved.
    pub async fn run_gated_mission(
        &self,
        request: &str,
        blueprint: Blueprint,
    ) -> OrchestratorResult<MissionReport> {
        let decision = self.gate.evaluate(request);
        if !decision.approved() {
            warn!(
                risk = decision.risk_score,
                clarity = decision.clarity_score,
                "Request blocked by pre-flight gate"
            );
            return Err(MissionError::GateRejected {
                feedback: decision.feedback,
            });
        }
        self.run_mission(blueprint).await
    }

    /// Run a validated blueprint to completion.
    pub async fn run_mission(&self, blueprint: Blueprint) -> OrchestratorResult<MissionReport> {
        // With the receiver dropped, every send fails cheaply instead
        // of buffering; emitters ignore send errors.
        let (event_tx, event_rx) = mpsc::channel(64);
        drop(event_rx);
        self.run_mission_with_events(blueprint, event_tx).await
    }

    /// Run a blueprint, streaming execution events to `event_tx`.
    pub async fn run_mission_with_events(
        &self,
        blueprint: Blueprint,
        event_tx: mpsc::Sender<ExecutionEvent>,
    ) -> OrchestratorResult<MissionReport> {
        // Structural validation aborts the mission before any task runs.
        blueprint.validate(&self.registry)?;

        let mission_id = blueprint.mission_id;
        let ctx = MissionContext::new(mission_id, blueprint.mission_overview.clone());
        // Blueprint bound wins; the configured executor bound is the
        // fallback. Both are validated positive upstream.
        let concurrency_limit = blueprint
            .concurrency
            .max_concurrent_tasks
            .unwrap_or(self.config.executor.max_concurrent_tasks);

        let _ = event_tx
            .send(ExecutionEvent::MissionStarted {
                mission_id,
                total_tasks: blueprint.total_tasks(),
                phase_count: blueprint.phases.len(),
            })
            .await;
        info!(
            mission_id = %mission_id,
            phases = blueprint.phases.len(),
            tasks = blueprint.total_tasks(),
            concurrency = concurrency_limit,
            "Mission started"
        );

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut satisfied: HashSet<String> = HashSet::new();
        let mut verdicts: Vec<TaskVerdict> = Vec::new();

        for phase in &blueprint.phases {
            if *cancel_rx.borrow() {
                // A critical failure halted the mission; later phases
                // are skipped wholesale but still reported.
                for task in &phase.tasks {
                    let _ = event_tx
                        .send(ExecutionEvent::TaskSkipped {
                            task_id: task.task_id.clone(),
                        })
                        .await;
                    verdicts.push(TaskVerdict::skipped(task.task_id.clone(), task.critical));
                }
                continue;
            }

            let outcome = self
                .scheduler
                .execute_phase(
                    mission_id,
                    phase,
                    concurrency_limit,
                    &satisfied,
                    &ctx,
                    &cancel_tx,
                    &event_tx,
                )
                .await?;

            satisfied.extend(outcome.completed_ids().map(str::to_string));
            verdicts.extend(outcome.verdicts);
        }

        let halted_early = *cancel_rx.borrow();
        let report = self.aggregator.aggregate(mission_id, &verdicts, halted_early);

        let _ = event_tx
            .send(ExecutionEvent::MissionCompleted {
                mission_id,
                status: report.status,
                success_rate: report.success_rate,
            })
            .await;

        if let Err(e) = self
            .ledger
            .record_mission_outcome(mission_id, &report)
            .await
        {
            error!(mission_id = %mission_id, error = %e, "Failed to record mission outcome");
            return Err(MissionError::LedgerError(e.to_string()));
        }

        Ok(report)
    }

    /// The effective configuration for this session.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}
