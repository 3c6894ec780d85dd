//! Services: the orchestration business logic.

pub mod dependency_resolver;
pub mod mission_aggregator;
pub mod phase_scheduler;
pub mod preflight_gate;
pub mod recovery_coordinator;
pub mod task_executor;

pub use dependency_resolver::DependencyResolver;
pub use mission_aggregator::MissionAggregator;
pub use phase_scheduler::{ExecutionEvent, PhaseOutcome, PhaseScheduler, TaskVerdict};
pub use preflight_gate::PreflightGate;
pub use recovery_coordinator::{RecoveryCoordinator, RecoveryOutcome, RecoveryState};
pub use task_executor::TaskExecutor;
