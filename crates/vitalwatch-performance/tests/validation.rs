use proptest::prelude::*;

use vitalwatch_performance::{BudgetValidator, Environment, PerformanceBudget};
use vitalwatch_monitoring::{AnimationStat, FrameTimingStats, Severity, WebVital, WebVitalsSnapshot};

fn snapshot(entries: &[(WebVital, f64)]) -> WebVitalsSnapshot {
    let mut snapshot = WebVitalsSnapshot::new();
    for (vital, value) in entries {
        snapshot.set(*vital, *value);
    }
    snapshot
}

fn frame_stats(average_frame_time: f64, average_fps: f64) -> FrameTimingStats {
    FrameTimingStats {
        average_frame_time,
        average_fps,
        p95_frame_time: average_frame_time,
        p99_frame_time: average_frame_time,
        dropped_frames: 0,
        smoothness_score: 100.0,
    }
}

#[test]
fn score_is_zero_at_one_critical_two_high_three_medium() {
    // 1 critical (FID) + 2 high (LCP, TTI) + 3 medium (CLS, TTFB, memory):
    // max(0, 100 - 30 - 40 - 30) = 0.
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    let snapshot = snapshot(&[
        (WebVital::Lcp, 2000.0),
        (WebVital::Fid, 100.0),
        (WebVital::Cls, 0.5),
        (WebVital::Tti, 4000.0),
        (WebVital::Ttfb, 900.0),
    ]);

    let outcome = BudgetValidator::validate(&snapshot, &[], None, Some(500.0), &budget);

    assert_eq!(outcome.critical_count(), 1);
    assert_eq!(outcome.high_count(), 2);
    assert_eq!(outcome.medium_count(), 3);
    assert_eq!(outcome.score, 0);
    assert!(!outcome.passed);
}

#[test]
fn single_high_violation_still_passes_at_eighty() {
    // The pass rule is deliberately lenient: zero critical and at most
    // one high passes.
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    let snapshot = snapshot(&[(WebVital::Lcp, 1200.0)]);

    let outcome = BudgetValidator::validate(&snapshot, &[], None, None, &budget);

    assert_eq!(outcome.score, 80);
    assert!(outcome.passed);
}

#[test]
fn two_high_violations_fail() {
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    let snapshot = snapshot(&[(WebVital::Lcp, 1200.0), (WebVital::Tti, 2500.0)]);

    let outcome = BudgetValidator::validate(&snapshot, &[], None, None, &budget);

    assert_eq!(outcome.high_count(), 2);
    assert_eq!(outcome.score, 60);
    assert!(!outcome.passed);
}

#[test]
fn clinical_reference_scenario_scores_fifty() {
    // LCP 900 (pass), FID 60 (critical), CLS 0.05 (pass), FPS 58 (high).
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    let snapshot = snapshot(&[
        (WebVital::Lcp, 900.0),
        (WebVital::Fid, 60.0),
        (WebVital::Cls, 0.05),
    ]);
    let frames = frame_stats(16.0, 58.0);

    let outcome = BudgetValidator::validate(&snapshot, &[], Some(&frames), None, &budget);

    assert_eq!(outcome.critical_count(), 1);
    assert_eq!(outcome.high_count(), 1);
    assert_eq!(outcome.score, 50);
    assert!(!outcome.passed);
}

#[test]
fn missing_metrics_are_skipped_not_violated() {
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    // No CLS entry at all.
    let snapshot = snapshot(&[(WebVital::Lcp, 900.0)]);

    let outcome = BudgetValidator::validate(&snapshot, &[], None, None, &budget);

    assert!(outcome.violations.is_empty());
    assert_eq!(outcome.score, 100);
    assert!(outcome.passed);
}

#[test]
fn validate_is_pure() {
    let budget = PerformanceBudget::for_environment(Environment::Production);
    let snapshot = snapshot(&[(WebVital::Lcp, 3000.0), (WebVital::Cls, 0.2)]);
    let animations = vec![AnimationStat {
        name: "hero".to_string(),
        average: 250.0,
        min: 200.0,
        max: 300.0,
        p95: 290.0,
        count: 10,
        avg_fps: 4.0,
        budget_compliant: false,
    }];
    let frames = frame_stats(20.0, 50.0);

    let first = BudgetValidator::validate(
        &snapshot,
        &animations,
        Some(&frames),
        Some(300.0),
        &budget,
    );
    let second = BudgetValidator::validate(
        &snapshot,
        &animations,
        Some(&frames),
        Some(300.0),
        &budget,
    );

    assert_eq!(first, second);
}

#[test]
fn violations_follow_the_fixed_check_order() {
    let budget = PerformanceBudget::for_environment(Environment::Clinical);
    let snapshot = snapshot(&[
        (WebVital::Ttfb, 900.0),
        (WebVital::Lcp, 2000.0),
        (WebVital::Cls, 0.5),
    ]);
    let animations = vec![AnimationStat {
        name: "fade".to_string(),
        average: 200.0,
        min: 180.0,
        max: 220.0,
        p95: 215.0,
        count: 5,
        avg_fps: 5.0,
        budget_compliant: false,
    }];
    let frames = frame_stats(30.0, 33.0);

    let outcome = BudgetValidator::validate(
        &snapshot,
        &animations,
        Some(&frames),
        Some(400.0),
        &budget,
    );

    let metrics: Vec<&str> = outcome.violations.iter().map(|v| v.metric.as_str()).collect();
    assert_eq!(
        metrics,
        vec!["LCP", "CLS", "TTFB", "animation:fade", "frameTime", "fps", "memory"]
    );
}

proptest! {
    #[test]
    fn score_stays_in_range_and_pass_rule_holds(
        lcp in 0.0f64..10_000.0,
        fid in 0.0f64..1_000.0,
        cls in 0.0f64..2.0,
        tti in 0.0f64..10_000.0,
        ttfb in 0.0f64..3_000.0,
        memory in 0.0f64..1_024.0,
    ) {
        let budget = PerformanceBudget::for_environment(Environment::Production);
        let snapshot = snapshot(&[
            (WebVital::Lcp, lcp),
            (WebVital::Fid, fid),
            (WebVital::Cls, cls),
            (WebVital::Tti, tti),
            (WebVital::Ttfb, ttfb),
        ]);

        let outcome = BudgetValidator::validate(&snapshot, &[], None, Some(memory), &budget);

        prop_assert!(outcome.score <= 100);
        if outcome.passed {
            prop_assert_eq!(outcome.critical_count(), 0);
            prop_assert!(outcome.high_count() <= 1);
        }
        for violation in &outcome.violations {
            prop_assert!(violation.severity != Severity::Low);
        }
    }
}
