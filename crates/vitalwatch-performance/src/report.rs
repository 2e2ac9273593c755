//! Markdown report generation and exit-code policy

use chrono::{DateTime, Utc};

use crate::lighthouse::LighthouseScores;
use crate::regression::{BaselineStatus, MetricDelta};
use crate::validation::ValidationOutcome;
use vitalwatch_monitoring::{Environment, Severity, WebVitalsSnapshot};

/// Regressions worse than this escalate the exit code to warning
const EXIT_CODE_REGRESSION_PERCENT: f64 = 20.0;

/// A rendered run report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// 0 pass, 1 warning/regression, 2 critical failure
    pub exit_code: i32,
    pub markdown: String,
}

/// Everything one report is rendered from
///
/// The timestamp is an explicit input: identical inputs always render an
/// identical report, which keeps snapshot-based testing stable.
pub struct ReportContext<'a> {
    pub environment: Environment,
    pub validation: &'a ValidationOutcome,
    pub regressions: &'a [MetricDelta],
    pub improvements: &'a [MetricDelta],
    pub snapshot: &'a WebVitalsSnapshot,
    pub lighthouse: Option<&'a LighthouseScores>,
    pub baseline_status: BaselineStatus,
    pub generated_at: DateTime<Utc>,
}

/// Renders validation results into Markdown plus an exit code
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate(ctx: &ReportContext<'_>) -> Report {
        Report {
            exit_code: exit_code(ctx.validation, ctx.regressions),
            markdown: render_markdown(ctx),
        }
    }
}

fn exit_code(validation: &ValidationOutcome, regressions: &[MetricDelta]) -> i32 {
    if validation.critical_count() > 0 {
        return 2;
    }
    let severe_regression = regressions
        .iter()
        .any(|d| d.percent_change.abs() > EXIT_CODE_REGRESSION_PERCENT);
    if validation.high_count() > 0 || severe_regression {
        return 1;
    }
    0
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🚨",
        Severity::High => "⚠️",
        Severity::Medium => "ℹ️",
        Severity::Low => "📝",
    }
}

fn render_markdown(ctx: &ReportContext<'_>) -> String {
    let mut report = String::from("# Performance Report\n\n");

    report.push_str("## Summary\n\n");
    let status = if ctx.validation.passed {
        "✅ PASS"
    } else {
        "❌ FAIL"
    };
    report.push_str(&format!("- Status: {status}\n"));
    report.push_str(&format!("- Environment: {}\n", ctx.environment));
    report.push_str(&format!("- Score: {}/100\n", ctx.validation.score));
    report.push_str(&format!(
        "- Violations: {}\n",
        ctx.validation.violations.len()
    ));
    report.push_str(&format!("- Regressions: {}\n", ctx.regressions.len()));
    report.push_str(&format!("- Improvements: {}\n", ctx.improvements.len()));
    report.push_str(&format!(
        "- Generated: {}\n",
        ctx.generated_at.to_rfc3339()
    ));

    match ctx.baseline_status {
        BaselineStatus::Loaded => {}
        BaselineStatus::NotSet => {
            report.push_str("\n> No baseline set; regression comparison skipped.\n");
        }
        BaselineStatus::Corrupt => {
            report.push_str(
                "\n> ⚠️ Baseline file was unreadable; regression comparison skipped. \
                 Re-run with `--baseline` to capture a fresh one.\n",
            );
        }
    }

    report.push_str("\n## Current Metrics\n\n");
    if ctx.snapshot.is_empty() {
        report.push_str("No web vitals observed.\n");
    } else {
        for (vital, value) in ctx.snapshot.observed() {
            report.push_str(&format!("- {vital}: {value:.2}\n"));
        }
    }

    report.push_str("\n## Budget Violations\n\n");
    if ctx.validation.violations.is_empty() {
        report.push_str("None. All tracked metrics are within budget.\n");
    } else {
        for violation in &ctx.validation.violations {
            report.push_str(&format!(
                "- {} [{}] {}\n",
                severity_icon(violation.severity),
                violation.severity,
                violation.message
            ));
        }
    }

    if !ctx.regressions.is_empty() {
        report.push_str("\n## Regressions\n\n");
        for delta in ctx.regressions {
            report.push_str(&format!(
                "- 📉 {}: {:.2} → {:.2} ({:+.1}%)\n",
                delta.metric, delta.baseline, delta.current, delta.percent_change
            ));
        }
    }

    if !ctx.improvements.is_empty() {
        report.push_str("\n## Improvements\n\n");
        for delta in ctx.improvements {
            report.push_str(&format!(
                "- 📈 {}: {:.2} → {:.2} ({:+.1}%)\n",
                delta.metric, delta.baseline, delta.current, delta.percent_change
            ));
        }
    }

    if let Some(scores) = ctx.lighthouse {
        report.push_str("\n## Lighthouse Scores\n\n");
        report.push_str(&format!("- Performance: {:.0}\n", scores.performance));
        report.push_str(&format!("- Accessibility: {:.0}\n", scores.accessibility));
        report.push_str(&format!("- Best Practices: {:.0}\n", scores.best_practices));
        report.push_str(&format!("- SEO: {:.0}\n", scores.seo));
    }

    let recommendations = recommendations(ctx.validation);
    if !recommendations.is_empty() {
        report.push_str("\n## Recommendations\n\n");
        for recommendation in recommendations {
            report.push_str(&format!("- {recommendation}\n"));
        }
    }

    report
}

/// One recommendation per violating metric family, in a fixed order
fn recommendations(validation: &ValidationOutcome) -> Vec<&'static str> {
    let mut out = Vec::new();
    let violated = |pred: fn(&str) -> bool| {
        validation
            .violations
            .iter()
            .any(|v| pred(v.metric.as_str()))
    };

    if violated(|m| matches!(m, "LCP" | "TTFB" | "TTI")) {
        out.push(
            "Loading is over budget: preload critical assets, trim server response \
             time, and defer non-essential scripts.",
        );
    }
    if violated(|m| m == "FID") {
        out.push(
            "Interactivity is over budget: break up long main-thread tasks so the \
             first input is handled promptly.",
        );
    }
    if violated(|m| m == "CLS") {
        out.push(
            "Layout stability is over budget: reserve space for late-loading media \
             and avoid inserting content above existing content.",
        );
    }
    if violated(|m| m.starts_with("animation:") || m == "frameTime" || m == "fps") {
        out.push(
            "Animation is over budget: shorten or simplify animations and keep \
             per-frame work under 16.67ms.",
        );
    }
    if violated(|m| m == "memory") {
        out.push(
            "Memory is over budget: audit caches, release detached DOM nodes, and \
             unsubscribe unused observers.",
        );
    }
    out
}
