//! Execution records and mission outcomes.
//!
//! `TaskExecutionRecord` entries are append-only: one record per attempt
//! per state transition, preserving the full retry history for auditing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single task attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Submitted, waiting for a concurrency slot.
    Pending,
    /// Currently executing against its worker capability.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One state transition of one task attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionRecord {
    /// Mission this record belongs to.
    pub mission_id: Uuid,
    /// Task identifier from the blueprint.
    pub task_id: String,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// State the task moved into.
    pub status: TaskState,
    /// When this attempt started.
    pub started_at: DateTime<Utc>,
    /// When this attempt reached a terminal state, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Short error description for failed attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
}

impl TaskExecutionRecord {
    /// Create a record for a freshly submitted attempt.
    pub fn submitted(mission_id: Uuid, task_id: impl Into<String>, attempt: u32) -> Self {
        Self {
            mission_id,
            task_id: task_id.into(),
            attempt,
            status: TaskState::Pending,
            started_at: Utc::now(),
            finished_at: None,
            error_summary: None,
        }
    }

    /// Derive the next transition record from this one.
    pub fn advanced(&self, status: TaskState) -> Self {
        let mut next = self.clone();
        next.status = status;
        if status.is_terminal() {
            next.finished_at = Some(Utc::now());
        }
        next
    }

    /// Derive a failed transition record carrying an error summary.
    pub fn failed(&self, error: impl Into<String>) -> Self {
        let mut next = self.advanced(TaskState::Failed);
        next.error_summary = Some(error.into());
        next
    }
}

/// Classification of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The worker capability returned an error.
    Execution,
    /// The attempt exceeded the configured timeout.
    Timeout,
    /// No capability was available for the assigned role.
    Capability,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Timeout => "timeout",
            Self::Capability => "capability",
        }
    }
}

/// Coarse system-resource state at the moment a failure is captured.
///
/// Gives the solver a signal about execution pressure: a failure under
/// a saturated concurrency gate diagnoses differently than one in an
/// otherwise idle mission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    /// Task attempts executing when the snapshot was taken.
    pub in_flight_tasks: usize,
    /// Retries already consumed by this task.
    pub retries_used: u32,
}

/// Immutable snapshot captured at the moment a task attempt fails.
///
/// Input to the recovery coordinator's diagnose step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSnapshot {
    /// Mission this failure belongs to.
    pub mission_id: Uuid,
    /// The failing task.
    pub task_id: String,
    /// Role the task was delegated to.
    pub assigned_role: String,
    /// Failure classification.
    pub error_kind: FailureKind,
    /// The error message from the failed attempt.
    pub error_message: String,
    /// Task description, for diagnosis context.
    pub context: String,
    /// Errors from earlier attempts of the same task, oldest first.
    pub attempt_history: Vec<String>,
    /// Resource state when the failure was captured.
    #[serde(default)]
    pub system_state: SystemState,
    /// Which attempt failed.
    pub attempt: u32,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

/// Final status of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Success rate met the configured threshold.
    Completed,
    /// Some tasks succeeded, some failed permanently.
    CompletedWithErrors,
    /// No task succeeded.
    Failed,
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Summary of one permanently failed task, carried in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailureSummary {
    pub task_id: String,
    /// Last error observed after the retry budget was exhausted.
    pub error: String,
    /// Total attempts made, including the initial one.
    pub attempts: u32,
}

/// Aggregated outcome of a mission.
///
/// Always populated: there is no scenario in which orchestration
/// finishes without either a structural rejection or a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReport {
    pub mission_id: Uuid,
    pub status: MissionStatus,
    /// `completed / (completed + failed)`; 1.0 for an empty mission.
    pub success_rate: f64,
    pub total_tasks: usize,
    pub completed: usize,
    pub failed: usize,
    /// Tasks never started because a critical task failed.
    pub skipped: usize,
    /// Whether a critical task failure halted the mission early.
    pub halted_early: bool,
    /// Per-task failure summaries.
    pub failures: Vec<TaskFailureSummary>,
}
