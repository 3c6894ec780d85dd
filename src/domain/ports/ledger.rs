//! Ledger port - durable record of task and mission state transitions.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{MissionReport, TaskExecutionRecord};

/// Trait for the external execution ledger.
///
/// Called exactly once per state transition, append-only. The
/// orchestrator also consults the ledger for idempotency: a task that
/// already completed in an earlier run of the same mission is skipped.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append one task state transition.
    async fn record_transition(&self, record: &TaskExecutionRecord) -> Result<()>;

    /// Record the final mission outcome. Called once per mission.
    async fn record_mission_outcome(&self, mission_id: Uuid, report: &MissionReport)
        -> Result<()>;

    /// Whether a task already has a completed record for this mission.
    async fn was_completed(&self, mission_id: Uuid, task_id: &str) -> Result<bool>;
}
