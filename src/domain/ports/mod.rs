//! Ports - interfaces to external collaborators.

pub mod capability;
pub mod ledger;
pub mod solver;

pub use capability::{CapabilityRegistry, TaskFailure, TaskOutput, WorkerCapability};
pub use ledger::Ledger;
pub use solver::{NullSolver, Solver};
