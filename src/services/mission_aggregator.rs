//! Mission aggregator service.
//!
//! Folds per-task verdicts into the final mission outcome. The
//! success-rate threshold is policy carried in configuration, not
//! hardcoded business logic; 0.8 is the documented default baseline.

use tracing::info;
use uuid::Uuid;

use crate::domain::models::{AggregatorConfig, MissionReport, MissionStatus, TaskFailureSummary};
use crate::services::phase_scheduler::TaskVerdict;

/// Computes the final mission status and success rate.
#[derive(Debug, Clone, Default)]
pub struct MissionAggregator {
    config: AggregatorConfig,
}

impl MissionAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate all task verdicts into a mission report.
    ///
    /// `success_rate = completed / (completed + failed)`; skipped tasks
    /// are excluded from the rate but reported. An empty mission is
    /// trivially completed.
    pub fn aggregate(
        &self,
        mission_id: Uuid,
        verdicts: &[TaskVerdict],
        halted_early: bool,
    ) -> MissionReport {
        let completed = verdicts.iter().filter(|v| v.succeeded).count();
        let skipped = verdicts.iter().filter(|v| v.skipped).count();
        let failed = verdicts.len() - completed - skipped;

        let attempted = completed + failed;
        let success_rate = if attempted == 0 {
            1.0
        } else {
            completed as f64 / attempted as f64
        };

        let status = if success_rate >= self.config.success_threshold {
            MissionStatus::Completed
        } else if completed > 0 {
            MissionStatus::CompletedWithErrors
        } else {
            MissionStatus::Failed
        };

        let failures: Vec<TaskFailureSummary> = verdicts
            .iter()
            .filter(|v| !v.succeeded && !v.skipped)
            .map(|v| TaskFailureSummary {
                task_id: v.task_id.clone(),
                error: v
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
                attempts: v.attempts,
            })
            .collect();

        info!(
            mission_id = %mission_id,
            status = %status,
            success_rate,
            completed,
            failed,
            skipped,
            "Mission aggregated"
        );

        MissionReport {
            mission_id,
            status,
            success_rate,
            total_tasks: verdicts.len(),
            completed,
            failed,
            skipped,
            halted_early,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(id: &str, succeeded: bool) -> TaskVerdict {
        TaskVerdict {
            task_id: id.to_string(),
            succeeded,
            skipped: false,
            attempts: 1,
            error: if succeeded {
                None
            } else {
                Some("boom".to_string())
            },
            critical: false,
        }
    }

    fn aggregator() -> MissionAggregator {
        MissionAggregator::new(AggregatorConfig::default())
    }

    #[test]
    fn test_all_completed() {
        let verdicts = vec![verdict("a", true), verdict("b", true), verdict("c", true)];
        let report = aggregator().aggregate(Uuid::new_v4(), &verdicts, false);
        assert_eq!(report.status, MissionStatus::Completed);
        assert!((report.success_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.total_tasks, 3);
        assert_eq!(report.completed, 3);
        assert_eq!(report.failed, 0);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_three_of_five_is_completed_with_errors() {
        let verdicts = vec![
            verdict("a", true),
            verdict("b", true),
            verdict("c", true),
            verdict("d", false),
            verdict("e", false),
        ];
        let report = aggregator().aggregate(Uuid::new_v4(), &verdicts, false);
        assert!((report.success_rate - 0.6).abs() < 1e-9);
        assert_eq!(report.status, MissionStatus::CompletedWithErrors);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].task_id, "d");
    }

    #[test]
    fn test_no_success_is_failed() {
        let verdicts = vec![verdict("a", false), verdict("b", false)];
        let report = aggregator().aggregate(Uuid::new_v4(), &verdicts, false);
        assert_eq!(report.status, MissionStatus::Failed);
        assert!((report.success_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_mission_is_trivially_completed() {
        let report = aggregator().aggregate(Uuid::new_v4(), &[], false);
        assert_eq!(report.status, MissionStatus::Completed);
        assert!((report.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skipped_excluded_from_rate() {
        let verdicts = vec![
            verdict("a", true),
            TaskVerdict {
                task_id: "b".to_string(),
                succeeded: false,
                skipped: true,
                attempts: 0,
                error: None,
                critical: false,
            },
        ];
        let report = aggregator().aggregate(Uuid::new_v4(), &verdicts, true);
        assert!((report.success_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.skipped, 1);
        assert!(report.halted_early);
    }

    #[test]
    fn test_custom_threshold_is_policy() {
        let strict = MissionAggregator::new(AggregatorConfig {
            success_threshold: 1.0,
        });
        let verdicts = vec![
            verdict("a", true),
            verdict("b", true),
            verdict("c", true),
            verdict("d", true),
            verdict("e", false),
        ];
        let report = strict.aggregate(Uuid::new_v4(), &verdicts, false);
        assert_eq!(report.status, MissionStatus::CompletedWithErrors);
    }
}
