use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vitalwatch_performance::{
    BaselineMetrics, BaselineSnapshot, BudgetValidator, Environment, LighthouseRunner,
    MetricDelta, PerformanceBudget, RegressionDetector, Report, ReportContext, ReportGenerator,
    ValidationOutcome,
};

/// VitalWatch budget validation and regression detection
#[derive(Parser)]
#[command(name = "vitalwatch-performance")]
#[command(about = "Validate performance metrics against budgets and a stored baseline")]
struct Cli {
    /// Target environment (development|staging|production|clinical);
    /// defaults to VITALWATCH_ENV, then production
    #[arg(value_name = "ENVIRONMENT")]
    environment: Option<Environment>,

    /// Metrics snapshot JSON captured from the running page
    #[arg(short, long)]
    metrics: PathBuf,

    /// Write the current metrics as the new baseline and exit
    #[arg(long)]
    baseline: bool,

    /// Baseline file path
    #[arg(long, default_value = "performance-baseline.json")]
    baseline_file: PathBuf,

    /// Run a Lighthouse audit and fold its scores into the report
    #[arg(long)]
    lighthouse: bool,

    /// URL audited when --lighthouse is set
    #[arg(long, default_value = "http://localhost:3000")]
    lighthouse_url: String,

    /// Directory the Markdown report is written to
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            // Fatal orchestration error: nothing was measured, no report.
            eprintln!("❌ {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let environment = cli.environment.unwrap_or_else(Environment::from_env);
    let budget = PerformanceBudget::for_environment(environment);

    let metrics = load_metrics(&cli.metrics)?;

    if cli.baseline {
        let snapshot = BaselineSnapshot::new(Utc::now(), environment, metrics);
        snapshot.save(&cli.baseline_file).with_context(|| {
            format!("failed to write baseline {}", cli.baseline_file.display())
        })?;
        println!("✅ Baseline written to {}", cli.baseline_file.display());
        return Ok(0);
    }

    let validation = BudgetValidator::validate(
        &metrics.web_vitals,
        &metrics.animations,
        metrics.frame_timing_stats.as_ref(),
        metrics.memory_mb,
        &budget,
    );

    let (detector, baseline_status) = RegressionDetector::from_file(&cli.baseline_file);
    let current_fps = metrics.frame_timing_stats.as_ref().map(|f| f.average_fps);
    let regressions = detector.detect_regressions(&metrics.web_vitals, current_fps);
    let improvements = detector.detect_improvements(&metrics.web_vitals, current_fps);

    let lighthouse = if cli.lighthouse {
        LighthouseRunner::new().audit(&cli.lighthouse_url).await
    } else {
        None
    };

    let generated_at = Utc::now();
    let report = ReportGenerator::generate(&ReportContext {
        environment,
        validation: &validation,
        regressions: &regressions,
        improvements: &improvements,
        snapshot: &metrics.web_vitals,
        lighthouse: lighthouse.as_ref(),
        baseline_status,
        generated_at,
    });

    let report_path = write_report(&cli.report_dir, &report, generated_at)?;
    print_summary(&validation, &regressions, &report, &report_path);

    Ok(u8::try_from(report.exit_code).unwrap_or(2))
}

fn load_metrics(path: &PathBuf) -> anyhow::Result<BaselineMetrics> {
    BaselineMetrics::load(path)
        .with_context(|| format!("failed to load metrics file {}", path.display()))
}

fn write_report(
    dir: &PathBuf,
    report: &Report,
    generated_at: chrono::DateTime<Utc>,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let path = dir.join(format!(
        "performance-report-{}.md",
        generated_at.format("%Y%m%d-%H%M%S")
    ));
    std::fs::write(&path, &report.markdown)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

fn print_summary(
    validation: &ValidationOutcome,
    regressions: &[MetricDelta],
    report: &Report,
    report_path: &PathBuf,
) {
    let status = if validation.passed {
        "✅ PASS"
    } else {
        "❌ FAIL"
    };
    println!("=== Performance Validation ===");
    println!("{status} — score {}/100", validation.score);

    for violation in &validation.violations {
        println!("  ⚠️  {}", violation.message);
    }
    for regression in regressions {
        println!(
            "  📉 {}: {:.2} → {:.2} ({:+.1}%)",
            regression.metric, regression.baseline, regression.current, regression.percent_change
        );
    }

    println!("📄 Report: {}", report_path.display());
    println!("Exit code: {}", report.exit_code);
}
