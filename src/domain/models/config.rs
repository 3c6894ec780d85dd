//! Orchestrator configuration model.
//!
//! All tuning constants live here rather than in the services: gate
//! thresholds, concurrency and timeout defaults, retry budgets, and the
//! success-rate threshold are policy, not business logic.

use serde::{Deserialize, Serialize};

/// Thresholds for the pre-flight gate decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Risk at or above this rejects the request outright.
    pub risk_block_threshold: f64,
    /// Risk at or above this approves with caution suggestions.
    pub risk_caution_threshold: f64,
    /// Clarity below this rejects the request as too ambiguous.
    pub clarity_block_threshold: f64,
    /// Clarity below this approves with improvement suggestions.
    pub clarity_advise_threshold: f64,
    /// Word count above which a request earns a length bonus.
    pub length_bonus_words: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            risk_block_threshold: 0.6,
            risk_caution_threshold: 0.3,
            clarity_block_threshold: 0.4,
            clarity_advise_threshold: 0.6,
            length_bonus_words: 20,
        }
    }
}

/// Configuration for phase scheduling and task execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Fallback concurrency bound when the blueprint does not set one.
    pub max_concurrent_tasks: usize,
    /// Timeout for individual task attempts (seconds).
    pub task_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
            task_timeout_secs: 600,
        }
    }
}

/// Configuration for the recovery coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Retry budget when a task does not set its own.
    pub default_retry_budget: u32,
    /// Base delay before a retry attempt (milliseconds); doubles per
    /// attempt up to `max_backoff_ms`.
    pub initial_backoff_ms: u64,
    /// Upper bound on the retry delay (milliseconds).
    pub max_backoff_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            default_retry_budget: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 5_000,
        }
    }
}

/// Configuration for mission outcome aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Success rate at or above which a mission counts as completed.
    /// The 0.8 default is the documented baseline for tests.
    pub success_threshold: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            success_threshold: 0.8,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    pub level: String,
    /// One of: json, pretty.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub gate: GateConfig,
    pub executor: ExecutorConfig,
    pub recovery: RecoveryConfig,
    pub aggregator: AggregatorConfig,
    pub logging: LoggingConfig,
}
