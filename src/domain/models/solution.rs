//! Solver solution types.
//!
//! A `Solution` is the solver's answer to a failure diagnosis request.
//! Solutions must pass schema validation before being applied; an
//! invalid solution is treated as "no fix available", never as a crash.

use serde::{Deserialize, Serialize};

/// Whether the solver found a usable fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// The solver proposes a fix.
    SolutionFound,
    /// The solver could not determine a fix.
    NoSolution,
}

/// The kind of fix a solution proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionKind {
    /// Patch to the task's work product.
    CodeFix,
    /// Amendment to the plan (task description, approach).
    PlanChange,
    /// System-level change (environment, resources).
    SystemFix,
}

impl SolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeFix => "code_fix",
            Self::PlanChange => "plan_change",
            Self::SystemFix => "system_fix",
        }
    }
}

/// A proposed fix produced by the pluggable solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub status: SolutionStatus,
    pub solution_kind: SolutionKind,
    /// The fix payload; meaning depends on `solution_kind`.
    #[serde(default)]
    pub solution_value: String,
    /// Solver confidence in `[0, 1]`.
    pub confidence: f64,
    /// Why the solver believes this fix addresses the failure.
    #[serde(default)]
    pub reasoning: String,
}

impl Solution {
    /// Validate the solution against the schema contract.
    ///
    /// A solution is usable only when the solver reports
    /// `solution_found`, confidence sits in `[0, 1]`, and the value is
    /// non-empty. Anything else means "no fix available".
    pub fn validate(&self) -> Result<(), String> {
        if self.status != SolutionStatus::SolutionFound {
            return Err("solver did not find a solution".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) || self.confidence.is_nan() {
            return Err(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            ));
        }
        if self.solution_value.trim().is_empty() {
            return Err("solutionValue is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_solution() -> Solution {
        Solution {
            status: SolutionStatus::SolutionFound,
            solution_kind: SolutionKind::CodeFix,
            solution_value: "retry with corrected input path".to_string(),
            confidence: 0.9,
            reasoning: "path typo in task description".to_string(),
        }
    }

    #[test]
    fn test_valid_solution_passes() {
        assert!(valid_solution().validate().is_ok());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut s = valid_solution();
        s.confidence = 1.2;
        assert!(s.validate().is_err());

        s.confidence = -0.1;
        assert!(s.validate().is_err());

        s.confidence = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut s = valid_solution();
        s.solution_value = "   ".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_no_solution_rejected() {
        let mut s = valid_solution();
        s.status = SolutionStatus::NoSolution;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_unknown_kind_fails_deserialization() {
        let json = r#"{
            "status": "solution_found",
            "solutionKind": "prayer",
            "solutionValue": "hope",
            "confidence": 0.5
        }"#;
        assert!(serde_json::from_str::<Solution>(json).is_err());
    }
}
