//! Application layer: use case orchestration.

pub mod session;

pub use session::OrchestratorSession;
