//! Budget validation and regression detection for VitalWatch
//!
//! This crate provides the CI/CD side of the VitalWatch pipeline:
//! - Compliance scoring of a metrics snapshot against environment budgets
//! - Baseline persistence and percentage regression detection
//! - Optional Lighthouse audit folding
//! - Markdown report generation with automation-grade exit codes

pub mod error;
pub mod lighthouse;
pub mod regression;
pub mod report;
pub mod validation;

pub use error::{PerformanceError, Result};
pub use lighthouse::{LighthouseRunner, LighthouseScores};
pub use regression::{
    BaselineMetrics, BaselineSnapshot, BaselineStatus, MetricDelta, RegressionDetector,
    FPS_REGRESSION_THRESHOLD_PERCENT, WEB_VITALS_REGRESSION_THRESHOLD_PERCENT,
};
pub use report::{Report, ReportContext, ReportGenerator};
pub use validation::{BudgetValidator, ValidationOutcome, Violation};

pub use vitalwatch_monitoring::{Environment, PerformanceBudget};
