use chrono::{TimeZone, Utc};

use vitalwatch_monitoring::{Severity, WebVital, WebVitalsSnapshot};
use vitalwatch_performance::{
    BaselineStatus, Environment, LighthouseScores, MetricDelta, ReportContext, ReportGenerator,
    ValidationOutcome, Violation,
};

fn violation(metric: &str, severity: Severity) -> Violation {
    Violation {
        metric: metric.to_string(),
        severity,
        budget: 100.0,
        actual: 150.0,
        compliance_ratio: 1.5,
        message: format!("{metric} 150.00 exceeds budget 100.00"),
    }
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
    ValidationOutcome {
        passed: critical == 0 && high <= 1,
        score: (100_i64 - 30 * critical as i64 - 20 * high as i64 - 10 * medium as i64).max(0)
            as u32,
        violations,
    }
}

fn delta(metric: &str, baseline: f64, current: f64) -> MetricDelta {
    MetricDelta {
        metric: metric.to_string(),
        baseline,
        current,
        percent_change: (current - baseline) / baseline * 100.0,
    }
}

fn context<'a>(
    validation: &'a ValidationOutcome,
    regressions: &'a [MetricDelta],
    snapshot: &'a WebVitalsSnapshot,
) -> ReportContext<'a> {
    ReportContext {
        environment: Environment::Clinical,
        validation,
        regressions,
        improvements: &[],
        snapshot,
        lighthouse: None,
        baseline_status: BaselineStatus::Loaded,
        generated_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn critical_violation_exits_two() {
    let validation = outcome(vec![violation("FID", Severity::Critical)]);
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &[], &snapshot));
    assert_eq!(report.exit_code, 2);
}

#[test]
fn high_violation_exits_one() {
    let validation = outcome(vec![violation("LCP", Severity::High)]);
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &[], &snapshot));
    assert_eq!(report.exit_code, 1);
}

#[test]
fn severe_regression_exits_one_even_when_validation_passes() {
    let validation = outcome(vec![]);
    let regressions = vec![delta("LCP", 1000.0, 1250.0)];
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &regressions, &snapshot));
    assert_eq!(report.exit_code, 1);
}

#[test]
fn mild_regression_still_exits_zero() {
    let validation = outcome(vec![]);
    // 15% is a regression, but under the 20% exit-code escalation.
    let regressions = vec![delta("LCP", 1000.0, 1150.0)];
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &regressions, &snapshot));
    assert_eq!(report.exit_code, 0);
}

#[test]
fn clean_run_exits_zero() {
    let validation = outcome(vec![]);
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &[], &snapshot));
    assert_eq!(report.exit_code, 0);
    assert!(report.markdown.contains("✅ PASS"));
}

#[test]
fn report_is_deterministic_for_identical_inputs() {
    let validation = outcome(vec![
        violation("FID", Severity::Critical),
        violation("LCP", Severity::High),
    ]);
    let regressions = vec![delta("TTI", 2000.0, 2600.0)];
    let mut snapshot = WebVitalsSnapshot::new();
    snapshot.set(WebVital::Lcp, 1500.0);
    snapshot.set(WebVital::Fid, 150.0);

    let first = ReportGenerator::generate(&context(&validation, &regressions, &snapshot));
    let second = ReportGenerator::generate(&context(&validation, &regressions, &snapshot));
    assert_eq!(first, second);
}

#[test]
fn report_carries_all_sections() {
    let validation = outcome(vec![
        violation("FID", Severity::Critical),
        violation("CLS", Severity::Medium),
    ]);
    let regressions = vec![delta("LCP", 1000.0, 1300.0)];
    let improvements = vec![delta("TTI", 3000.0, 2000.0)];
    let mut snapshot = WebVitalsSnapshot::new();
    snapshot.set(WebVital::Lcp, 1300.0);

    let lighthouse = LighthouseScores {
        performance: 91.0,
        accessibility: 100.0,
        best_practices: 85.0,
        seo: 90.0,
    };

    let report = ReportGenerator::generate(&ReportContext {
        environment: Environment::Clinical,
        validation: &validation,
        regressions: &regressions,
        improvements: &improvements,
        snapshot: &snapshot,
        lighthouse: Some(&lighthouse),
        baseline_status: BaselineStatus::Loaded,
        generated_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
    });

    for heading in [
        "## Summary",
        "## Current Metrics",
        "## Budget Violations",
        "## Regressions",
        "## Improvements",
        "## Lighthouse Scores",
        "## Recommendations",
    ] {
        assert!(report.markdown.contains(heading), "missing {heading}");
    }
    assert!(report.markdown.contains("🚨"));
    assert!(report.markdown.contains("ℹ️"));
    assert!(report.markdown.contains("- Environment: clinical"));
}

#[test]
fn corrupt_baseline_is_surfaced_distinctly_from_not_set() {
    let validation = outcome(vec![]);
    let snapshot = WebVitalsSnapshot::new();

    let mut ctx = context(&validation, &[], &snapshot);
    ctx.baseline_status = BaselineStatus::Corrupt;
    let corrupt = ReportGenerator::generate(&ctx);

    let mut ctx = context(&validation, &[], &snapshot);
    ctx.baseline_status = BaselineStatus::NotSet;
    let not_set = ReportGenerator::generate(&ctx);

    assert!(corrupt.markdown.contains("unreadable"));
    assert!(not_set.markdown.contains("No baseline set"));
    assert!(!not_set.markdown.contains("unreadable"));
}

#[test]
fn recommendations_track_violating_families() {
    let validation = outcome(vec![
        violation("LCP", Severity::High),
        violation("fps", Severity::High),
    ]);
    let snapshot = WebVitalsSnapshot::new();
    let report = ReportGenerator::generate(&context(&validation, &[], &snapshot));

    assert!(report.markdown.contains("Loading is over budget"));
    assert!(report.markdown.contains("Animation is over budget"));
    assert!(!report.markdown.contains("Memory is over budget"));
}
