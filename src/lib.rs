//! Vanguard - Mission Execution Orchestrator
//!
//! Vanguard validates incoming mission requests, resolves task
//! dependencies into parallel execution layers, runs tasks through a
//! registry of worker capabilities with bounded concurrency, recovers
//! from failures via a diagnose-fix-retry loop, and aggregates the run
//! into a final mission report.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic, models, and ports
//! - **Application Layer** (`application`): Use case orchestration
//! - **Service Layer** (`services`): Gate, resolver, scheduler, executor,
//!   recovery, and aggregation services
//! - **Adapters** (`adapters`): Concrete port implementations
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vanguard::{Blueprint, CapabilityRegistry, OrchestratorSession};
//! use vanguard::adapters::InMemoryLedger;
//! use vanguard::domain::ports::NullSolver;
//! use vanguard::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let mut registry = CapabilityRegistry::new();
//!     // registry.register("builder", Arc::new(MyCapability));
//!     let session = OrchestratorSession::new(
//!         registry,
//!         Arc::new(NullSolver::new()),
//!         Arc::new(InMemoryLedger::new()),
//!         config,
//!     );
//!     let blueprint = Blueprint::from_planning_document(r#"{ ... }"#)?;
//!     let report = session.run_mission(blueprint).await?;
//!     println!("{}", report.status);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::OrchestratorSession;
pub use domain::errors::{MissionError, OrchestratorResult};
pub use domain::models::{
    Blueprint, GateDecision, MissionReport, MissionStatus, OrchestratorConfig, Phase,
    TaskExecutionRecord, TaskSpec, TaskState,
};
pub use domain::ports::{
    CapabilityRegistry, Ledger, Solver, TaskFailure, TaskOutput, WorkerCapability,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ExecutionEvent, PreflightGate};
