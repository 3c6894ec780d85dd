//! Pre-flight gate service.
//!
//! Heuristic scorer that classifies an incoming request as safe/unsafe
//! and clear/ambiguous before any blueprint is accepted for execution.
//! Pure function of the request text plus static pattern tables; it
//! never errors, unrecognized input simply yields low-confidence scores.

use tracing::debug;

use crate::domain::models::{ClarityLevel, GateConfig, GateDecision, RiskLevel};

/// Phrases indicating the request names a concrete action.
const SPECIFIC_ACTION_PATTERNS: &[&str] = &[
    "implement", "add", "create", "refactor", "fix", "update", "configure", "write", "build",
    "migrate", "optimize", "rename", "extract", "replace",
];

/// Phrases indicating technical specificity.
const TECHNICAL_PATTERNS: &[&str] = &[
    "function", "endpoint", "api", "database", "schema", "module", "struct", "query", "index",
    "cache", "test", "config", "http", "json", "crate", "table", "column", "handler", "queue",
];

/// Vague phrasing that lowers clarity.
const VAGUE_PATTERNS: &[&str] = &[
    "something", "somehow", "stuff", "things", "whatever", "etc", "fix it", "make it better",
    "improve it", "make it work", "clean up",
];

/// High-risk operations; a single hit pushes the request to rejection.
const HIGH_RISK_PATTERNS: &[&str] = &[
    "drop table", "drop database", "rm -rf", "delete all", "truncate", "format disk",
    "force push", "sudo rm", "wipe", "grant all", "disable auth",
];

/// Medium-risk operations; approved with caution.
const MEDIUM_RISK_PATTERNS: &[&str] = &[
    "delete", "remove", "overwrite", "reset", "kill", "deploy to production", "rewrite history",
    "revoke",
];

/// Read-only intent; lowers risk slightly.
const LOW_RISK_PATTERNS: &[&str] = &[
    "read-only", "read only", "inspect", "list", "view", "analyze", "report", "dry run", "audit",
];

const SPECIFIC_ACTION_WEIGHT: f64 = 0.08;
const TECHNICAL_WEIGHT: f64 = 0.06;
const VAGUE_PENALTY: f64 = 0.15;
const SHORT_REQUEST_PENALTY: f64 = 0.15;
const LENGTH_BONUS: f64 = 0.10;
const SHORT_REQUEST_WORDS: usize = 4;

const HIGH_RISK_WEIGHT: f64 = 0.8;
const MEDIUM_RISK_WEIGHT: f64 = 0.4;
const LOW_RISK_CREDIT: f64 = 0.1;

/// The pre-flight heuristic check performed before any execution begins.
#[derive(Debug, Clone, Default)]
pub struct PreflightGate {
    config: GateConfig,
}

impl PreflightGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Evaluate a request and produce a gate decision.
    ///
    /// Risk is checked before clarity: a high-risk request is rejected
    /// even when perfectly clear.
    pub fn evaluate(&self, request: &str) -> GateDecision {
        let text = request.to_lowercase();
        let word_count = text.split_whitespace().count();

        let clarity_score = self.clarity_score(&text, word_count);
        let risk_score = Self::risk_score(&text);

        let risk_level = if risk_score >= self.config.risk_block_threshold {
            RiskLevel::High
        } else if risk_score >= self.config.risk_caution_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let clarity_level = if clarity_score < self.config.clarity_block_threshold {
            ClarityLevel::Ambiguous
        } else if clarity_score < self.config.clarity_advise_threshold {
            ClarityLevel::Moderate
        } else {
            ClarityLevel::Clear
        };

        let (go_no_go, feedback, suggestions) = match (risk_level, clarity_level) {
            (RiskLevel::High, _) => (
                false,
                "Request involves high-risk operations and was blocked".to_string(),
                vec![
                    "Run the operation in a sandboxed environment first".to_string(),
                    "Split destructive steps into a separately reviewed request".to_string(),
                ],
            ),
            (RiskLevel::Medium, clarity) => {
                let mut suggestions = vec![
                    "Take a backup before running mutating operations".to_string(),
                    "Prefer a dry run where the tooling supports one".to_string(),
                ];
                if clarity != ClarityLevel::Clear {
                    suggestions.push(
                        "Name the exact resources the request should touch".to_string(),
                    );
                }
                (
                    true,
                    "Approved with caution: request touches mutating operations".to_string(),
                    suggestions,
                )
            }
            (RiskLevel::Low, ClarityLevel::Ambiguous) => (
                false,
                "Request is too ambiguous to execute safely".to_string(),
                vec![
                    "Describe the concrete action to perform".to_string(),
                    "Reference the specific technology or component involved".to_string(),
                ],
            ),
            (RiskLevel::Low, ClarityLevel::Moderate) => (
                true,
                "Approved; request could be more specific".to_string(),
                vec!["Add acceptance criteria or expected outputs".to_string()],
            ),
            (RiskLevel::Low, ClarityLevel::Clear) => {
                (true, "Approved".to_string(), Vec::new())
            }
        };

        debug!(
            clarity = clarity_score,
            risk = risk_score,
            go = go_no_go,
            "Pre-flight gate evaluated request"
        );

        GateDecision {
            clarity_score,
            risk_score,
            risk_level,
            clarity_level,
            go_no_go,
            feedback,
            suggestions,
        }
    }

    fn clarity_score(&self, text: &str, word_count: usize) -> f64 {
        let mut score = 0.5;

        score += count_hits(text, SPECIFIC_ACTION_PATTERNS) as f64 * SPECIFIC_ACTION_WEIGHT;
        score += count_hits(text, TECHNICAL_PATTERNS) as f64 * TECHNICAL_WEIGHT;
        score -= count_hits(text, VAGUE_PATTERNS) as f64 * VAGUE_PENALTY;

        // Richer requests are typically clearer; terse ones rarely are.
        if word_count >= self.config.length_bonus_words {
            score += LENGTH_BONUS;
        }
        if word_count < SHORT_REQUEST_WORDS {
            score -= SHORT_REQUEST_PENALTY;
        }

        score.clamp(0.0, 1.0)
    }

    fn risk_score(text: &str) -> f64 {
        let mut score = 0.0;

        score += count_hits(text, HIGH_RISK_PATTERNS) as f64 * HIGH_RISK_WEIGHT;
        score += count_hits(text, MEDIUM_RISK_PATTERNS) as f64 * MEDIUM_RISK_WEIGHT;
        score -= count_hits(text, LOW_RISK_PATTERNS) as f64 * LOW_RISK_CREDIT;

        score.clamp(0.0, 1.0)
    }
}

/// Count how many patterns appear in the text. Each pattern counts at
/// most once regardless of repetition.
fn count_hits(text: &str, patterns: &[&str]) -> usize {
    patterns.iter().filter(|p| text.contains(*p)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> PreflightGate {
        PreflightGate::new(GateConfig::default())
    }

    #[test]
    fn test_high_risk_rejected_regardless_of_clarity() {
        let decision = gate().evaluate(
            "Implement a cleanup job that will drop table users from the production \
             database schema after the migration finishes and verify the index counts",
        );
        assert!(!decision.go_no_go);
        assert_eq!(decision.risk_level, RiskLevel::High);
        assert!(decision.feedback.contains("high-risk"));
        assert!(!decision.suggestions.is_empty());
    }

    #[test]
    fn test_vague_short_request_rejected() {
        let decision = gate().evaluate("fix it");
        assert!(!decision.go_no_go);
        assert_eq!(decision.clarity_level, ClarityLevel::Ambiguous);
    }

    #[test]
    fn test_empty_request_rejected() {
        let decision = gate().evaluate("");
        assert!(!decision.go_no_go);
    }

    #[test]
    fn test_specific_technical_request_approved() {
        let decision = gate().evaluate(
            "Implement a new http endpoint in the orders module that accepts a json \
             payload, validates the schema, and writes an execution record with an \
             index on the mission identifier column",
        );
        assert!(decision.go_no_go);
        assert_eq!(decision.risk_level, RiskLevel::Low);
        assert_eq!(decision.clarity_level, ClarityLevel::Clear);
        assert!(decision.suggestions.is_empty());
    }

    #[test]
    fn test_medium_risk_approved_with_caution() {
        let decision = gate().evaluate(
            "Remove the deprecated configuration entries from the staging config \
             module and update the loader tests so the schema validation still passes",
        );
        assert!(decision.go_no_go);
        assert_eq!(decision.risk_level, RiskLevel::Medium);
        assert!(!decision.suggestions.is_empty());
    }

    #[test]
    fn test_read_only_intent_lowers_risk() {
        let risky = gate().evaluate("Reset the cache");
        let readonly = gate().evaluate("Inspect and analyze the cache, read only");
        assert!(readonly.risk_score < risky.risk_score);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        for request in [
            "",
            "drop table a; drop database b; rm -rf /; delete all the things",
            "implement add create refactor fix update configure write build migrate \
             optimize function endpoint api database schema module struct query index",
        ] {
            let decision = gate().evaluate(request);
            assert!((0.0..=1.0).contains(&decision.risk_score));
            assert!((0.0..=1.0).contains(&decision.clarity_score));
        }
    }

    #[test]
    fn test_decision_is_deterministic() {
        let a = gate().evaluate("Refactor the payment module tests");
        let b = gate().evaluate("Refactor the payment module tests");
        assert_eq!(a, b);
    }
}
