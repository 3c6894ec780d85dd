//! In-memory ledger adapter.
//!
//! Keeps the full append-only transition history in memory. Used by
//! the test suites and as the default ledger when no durable backend
//! is wired in.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::models::{MissionReport, TaskExecutionRecord, TaskState};
use crate::domain::ports::Ledger;

/// Append-only in-memory ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<Vec<TaskExecutionRecord>>,
    outcomes: RwLock<Vec<(Uuid, MissionReport)>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded transitions, in append order.
    pub async fn history(&self) -> Vec<TaskExecutionRecord> {
        self.records.read().await.clone()
    }

    /// Transitions for one task, in append order.
    pub async fn transitions_for(&self, task_id: &str) -> Vec<TaskExecutionRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Number of distinct attempts recorded for one task.
    pub async fn attempts_for(&self, task_id: &str) -> u32 {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.task_id == task_id)
            .map(|r| r.attempt)
            .max()
            .unwrap_or(0)
    }

    /// Recorded mission outcomes.
    pub async fn outcomes(&self) -> Vec<(Uuid, MissionReport)> {
        self.outcomes.read().await.clone()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn record_transition(&self, record: &TaskExecutionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn record_mission_outcome(
        &self,
        mission_id: Uuid,
        report: &MissionReport,
    ) -> Result<()> {
        self.outcomes.write().await.push((mission_id, report.clone()));
        Ok(())
    }

    async fn was_completed(&self, mission_id: Uuid, task_id: &str) -> Result<bool> {
        Ok(self.records.read().await.iter().any(|r| {
            r.mission_id == mission_id
                && r.task_id == task_id
                && r.status == TaskState::Completed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_append_only() {
        let ledger = InMemoryLedger::new();
        let mission = Uuid::new_v4();

        let first = TaskExecutionRecord::submitted(mission, "a", 1);
        ledger.record_transition(&first).await.unwrap();
        ledger
            .record_transition(&first.advanced(TaskState::Running))
            .await
            .unwrap();
        ledger
            .record_transition(&first.failed("boom"))
            .await
            .unwrap();

        let second = TaskExecutionRecord::submitted(mission, "a", 2);
        ledger.record_transition(&second).await.unwrap();
        ledger
            .record_transition(&second.advanced(TaskState::Completed))
            .await
            .unwrap();

        assert_eq!(ledger.history().await.len(), 5);
        assert_eq!(ledger.attempts_for("a").await, 2);
        assert!(ledger.was_completed(mission, "a").await.unwrap());
        assert!(!ledger.was_completed(mission, "b").await.unwrap());
        // Completion in another mission does not leak.
        assert!(!ledger.was_completed(Uuid::new_v4(), "a").await.unwrap());
    }
}
