//! Budget compliance scoring

use serde::{Deserialize, Serialize};

use vitalwatch_monitoring::{
    vital_violation_severity, AnimationStat, FrameTimingStats, PerformanceBudget, Severity,
    WebVital, WebVitalsSnapshot,
};

/// One independent budget violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub metric: String,
    pub severity: Severity,
    pub budget: f64,
    pub actual: f64,
    /// `actual / budget`; over 1.0 means a ceiling was breached, under
    /// 1.0 means a floor was missed
    pub compliance_ratio: f64,
    pub message: String,
}

/// Result of validating a snapshot against a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub passed: bool,
    /// 0..=100, penalized per violation severity
    pub score: u32,
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    pub fn critical_count(&self) -> usize {
        self.count(Severity::Critical)
    }

    pub fn high_count(&self) -> usize {
        self.count(Severity::High)
    }

    pub fn medium_count(&self) -> usize {
        self.count(Severity::Medium)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Scores current performance against a selected environment's budget
///
/// `validate` is a pure function of its inputs: identical snapshots,
/// stats, and budget always yield an identical outcome, independent of
/// call order or wall-clock time.
pub struct BudgetValidator;

impl BudgetValidator {
    /// Run every check in fixed order, collecting independent violations
    ///
    /// Metrics absent from the inputs are skipped entirely; missing data
    /// never produces a violation. The pass rule is deliberately
    /// asymmetric: zero critical violations and at most one high.
    pub fn validate(
        snapshot: &WebVitalsSnapshot,
        animation_stats: &[AnimationStat],
        frame_stats: Option<&FrameTimingStats>,
        memory_mb: Option<f64>,
        budget: &PerformanceBudget,
    ) -> ValidationOutcome {
        let mut violations = Vec::new();

        for vital in [
            WebVital::Lcp,
            WebVital::Fid,
            WebVital::Cls,
            WebVital::Tti,
            WebVital::Ttfb,
        ] {
            if let (Some(actual), Some(ceiling)) =
                (snapshot.get(vital), budget.vital_ceiling(vital))
            {
                if actual > ceiling {
                    violations.push(Violation {
                        metric: vital.as_str().to_string(),
                        severity: vital_violation_severity(vital),
                        budget: ceiling,
                        actual,
                        compliance_ratio: actual / ceiling,
                        message: format!("{vital} {actual:.2} exceeds budget {ceiling:.2}"),
                    });
                }
            }
        }

        for stat in animation_stats {
            if stat.average > budget.max_animation_duration_ms {
                violations.push(Violation {
                    metric: format!("animation:{}", stat.name),
                    severity: Severity::Medium,
                    budget: budget.max_animation_duration_ms,
                    actual: stat.average,
                    compliance_ratio: stat.average / budget.max_animation_duration_ms,
                    message: format!(
                        "animation '{}' averages {:.2}ms, over the {:.2}ms budget",
                        stat.name, stat.average, budget.max_animation_duration_ms
                    ),
                });
            }
        }

        if let Some(frames) = frame_stats {
            if frames.average_frame_time > budget.max_frame_time_ms {
                violations.push(Violation {
                    metric: "frameTime".to_string(),
                    severity: Severity::High,
                    budget: budget.max_frame_time_ms,
                    actual: frames.average_frame_time,
                    compliance_ratio: frames.average_frame_time / budget.max_frame_time_ms,
                    message: format!(
                        "average frame time {:.2}ms exceeds budget {:.2}ms",
                        frames.average_frame_time, budget.max_frame_time_ms
                    ),
                });
            }
            if frames.average_fps < budget.min_fps {
                violations.push(Violation {
                    metric: "fps".to_string(),
                    severity: Severity::High,
                    budget: budget.min_fps,
                    actual: frames.average_fps,
                    compliance_ratio: frames.average_fps / budget.min_fps,
                    message: format!(
                        "average FPS {:.1} is under the {:.1} floor",
                        frames.average_fps, budget.min_fps
                    ),
                });
            }
        }

        if let Some(memory) = memory_mb {
            if memory > budget.max_memory_mb {
                violations.push(Violation {
                    metric: "memory".to_string(),
                    severity: Severity::Medium,
                    budget: budget.max_memory_mb,
                    actual: memory,
                    compliance_ratio: memory / budget.max_memory_mb,
                    message: format!(
                        "memory usage {:.1}MB exceeds budget {:.1}MB",
                        memory, budget.max_memory_mb
                    ),
                });
            }
        }

        Self::outcome(violations)
    }

    fn outcome(violations: Vec<Violation>) -> ValidationOutcome {
        let critical = violations
            .iter()
            .filter(|v| v.severity == Severity::Critical)
            .count();
        let high = violations
            .iter()
            .filter(|v| v.severity == Severity::High)
            .count();
        let medium = violations
            .iter()
            .filter(|v| v.severity == Severity::Medium)
            .count();

        let penalty = 30 * critical + 20 * high + 10 * medium;
        let score = 100_i64.saturating_sub(penalty as i64).max(0) as u32;

        ValidationOutcome {
            passed: critical == 0 && high <= 1,
            score,
            violations,
        }
    }
}
