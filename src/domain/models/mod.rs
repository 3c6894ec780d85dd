//! Domain models for the mission orchestrator.

pub mod blueprint;
pub mod config;
pub mod context;
pub mod gate;
pub mod record;
pub mod solution;

pub use blueprint::{Blueprint, ConcurrencyPolicy, Phase, TaskSpec};
pub use config::{
    AggregatorConfig, ExecutorConfig, GateConfig, LoggingConfig, OrchestratorConfig,
    RecoveryConfig,
};
pub use context::MissionContext;
pub use gate::{ClarityLevel, GateDecision, RiskLevel};
pub use record::{
    FailureKind, FailureSnapshot, MissionReport, MissionStatus, SystemState,
    TaskExecutionRecord, TaskFailureSummary, TaskState,
};
pub use solution::{Solution, SolutionKind, SolutionStatus};
