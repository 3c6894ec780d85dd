//! Pre-flight gate decision model.

use serde::{Deserialize, Serialize};

/// Risk classification of an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Clarity classification of an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarityLevel {
    Ambiguous,
    Moderate,
    Clear,
}

/// Outcome of the pre-flight heuristic check.
///
/// Computed once per incoming request, never mutated afterward.
/// Callers must check `go_no_go` before invoking the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    /// Clarity score in `[0, 1]`.
    pub clarity_score: f64,
    /// Risk score in `[0, 1]`.
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub clarity_level: ClarityLevel,
    /// Whether execution may begin.
    pub go_no_go: bool,
    /// Human-readable explanation of the decision.
    pub feedback: String,
    /// Concrete suggestions for improving or safing the request.
    pub suggestions: Vec<String>,
}

impl GateDecision {
    /// Whether the request was approved for execution.
    pub fn approved(&self) -> bool {
        self.go_no_go
    }
}
