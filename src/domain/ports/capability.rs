//! Worker capability port - interface for role implementations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::{FailureKind, MissionContext, TaskSpec};

/// Successful output of a task execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutput {
    /// Short summary of what the task produced.
    #[serde(default)]
    pub summary: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TaskOutput {
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            data: None,
        }
    }
}

/// Typed failure returned by a worker capability.
///
/// Task failures are values, not panics or exceptions: the executor
/// returns `Result<TaskOutput, TaskFailure>` and the recovery
/// coordinator operates purely on the error variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Execution,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Capability,
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Trait for worker role implementations.
///
/// The orchestrator is agnostic to what a capability does internally;
/// implementations must be stateless with respect to the orchestrator
/// or own their own synchronization.
#[async_trait]
pub trait WorkerCapability: Send + Sync {
    /// Execute one task. Returns the produced output or a typed failure.
    async fn execute(
        &self,
        task: &TaskSpec,
        ctx: &MissionContext,
    ) -> Result<TaskOutput, TaskFailure>;
}

/// Registry mapping role identifiers to worker capabilities.
///
/// Resolved once at orchestrator construction; unknown roles are
/// rejected at blueprint-validation time, not at task execution time.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn WorkerCapability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability for a role, replacing any previous one.
    pub fn register(&mut self, role: impl Into<String>, capability: Arc<dyn WorkerCapability>) {
        self.capabilities.insert(role.into(), capability);
    }

    /// Look up the capability for a role.
    pub fn resolve(&self, role: &str) -> Option<Arc<dyn WorkerCapability>> {
        self.capabilities.get(role).cloned()
    }

    /// Check whether a role is registered.
    pub fn contains(&self, role: &str) -> bool {
        self.capabilities.contains_key(role)
    }

    /// Registered role names, sorted for stable output.
    pub fn roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = self.capabilities.keys().cloned().collect();
        roles.sort();
        roles
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("roles", &self.roles())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl WorkerCapability for Echo {
        async fn execute(
            &self,
            task: &TaskSpec,
            _ctx: &MissionContext,
        ) -> Result<TaskOutput, TaskFailure> {
            Ok(TaskOutput::with_summary(task.task_name.clone()))
        }
    }

    #[test]
    fn test_registry_resolution() {
        let mut registry = CapabilityRegistry::new();
        assert!(!registry.contains("echo"));

        registry.register("echo", Arc::new(Echo));
        assert!(registry.contains("echo"));
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("unknown").is_none());
        assert_eq!(registry.roles(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_capability_invocation() {
        let echo = Echo;
        let task = TaskSpec::new("t1", "hello", "echo");
        let ctx = MissionContext::default();
        let output = echo.execute(&task, &ctx).await.unwrap();
        assert_eq!(output.summary, "hello");
    }
}
