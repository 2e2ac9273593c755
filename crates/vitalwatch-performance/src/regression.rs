//! Baseline persistence and regression detection

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PerformanceError, Result};
use vitalwatch_monitoring::{
    AnimationStat, Environment, FrameTimingStats, WebVital, WebVitalsSnapshot,
};

/// A web vital is a regression when it worsens by more than this
pub const WEB_VITALS_REGRESSION_THRESHOLD_PERCENT: f64 = 10.0;

/// Average FPS is a regression when it drops by more than this; FPS
/// changes are felt more acutely than load-time drift
pub const FPS_REGRESSION_THRESHOLD_PERCENT: f64 = 5.0;

/// Vitals compared against the baseline, in reporting order
const REGRESSION_VITALS: [WebVital; 4] =
    [WebVital::Lcp, WebVital::Fid, WebVital::Cls, WebVital::Tti];

/// The metrics payload stored in a baseline file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineMetrics {
    pub web_vitals: WebVitalsSnapshot,
    pub animations: Vec<AnimationStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_timing_stats: Option<FrameTimingStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
}

impl BaselineMetrics {
    /// Read a metrics snapshot exported by the running page
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| PerformanceError::MetricsUnreadable {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A captured metrics snapshot used as the regression comparison point
///
/// Written wholesale on each explicit baseline-set operation; never
/// partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSnapshot {
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub metrics: BaselineMetrics,
}

impl BaselineSnapshot {
    pub fn new(
        timestamp: DateTime<Utc>,
        environment: Environment,
        metrics: BaselineMetrics,
    ) -> Self {
        Self {
            timestamp,
            environment: environment.to_string(),
            metrics,
        }
    }

    /// Read a baseline file, distinguishing missing from corrupt
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PerformanceError::BaselineNotFound(path.to_path_buf()));
            }
            Err(err) => return Err(PerformanceError::Io(err)),
        };
        serde_json::from_str(&content).map_err(|source| PerformanceError::BaselineCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the baseline file wholesale
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// How the baseline was (or was not) obtained, surfaced in the report so
/// operators can tell "never set" apart from "file unreadable"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    Loaded,
    NotSet,
    Corrupt,
}

/// One metric's change relative to the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub metric: String,
    pub baseline: f64,
    pub current: f64,
    /// Signed raw change: `(current - baseline) / baseline * 100`
    pub percent_change: f64,
}

/// Compares a live snapshot against a stored baseline
///
/// A missing or unreadable baseline degrades to "no regressions
/// possible"; both cases are logged and surfaced through
/// `BaselineStatus`, never panicked on.
#[derive(Debug, Default)]
pub struct RegressionDetector {
    baseline: Option<BaselineSnapshot>,
}

impl RegressionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the baseline from `path`, degrading gracefully
    pub fn from_file<P: AsRef<Path>>(path: P) -> (Self, BaselineStatus) {
        match BaselineSnapshot::load(path) {
            Ok(baseline) => (
                Self {
                    baseline: Some(baseline),
                },
                BaselineStatus::Loaded,
            ),
            Err(PerformanceError::BaselineNotFound(path)) => {
                info!(path = %path.display(), "no baseline set, skipping regression comparison");
                (Self::new(), BaselineStatus::NotSet)
            }
            Err(err) => {
                warn!(error = %err, "baseline unreadable, skipping regression comparison");
                (Self::new(), BaselineStatus::Corrupt)
            }
        }
    }

    /// Replace any prior baseline wholesale
    pub fn set_baseline(&mut self, baseline: BaselineSnapshot) {
        self.baseline = Some(baseline);
    }

    pub fn baseline(&self) -> Option<&BaselineSnapshot> {
        self.baseline.as_ref()
    }

    /// Metrics that worsened beyond their thresholds
    ///
    /// Web vitals regress when they grow more than 10%; average FPS
    /// regresses when it drops more than 5%. Metrics absent from either
    /// side are skipped silently.
    pub fn detect_regressions(
        &self,
        current: &WebVitalsSnapshot,
        current_fps: Option<f64>,
    ) -> Vec<MetricDelta> {
        self.deltas(current, current_fps)
            .into_iter()
            .filter(|d| is_regression(d))
            .collect()
    }

    /// Metrics that improved beyond the mirrored thresholds
    pub fn detect_improvements(
        &self,
        current: &WebVitalsSnapshot,
        current_fps: Option<f64>,
    ) -> Vec<MetricDelta> {
        self.deltas(current, current_fps)
            .into_iter()
            .filter(|d| is_improvement(d))
            .collect()
    }

    fn deltas(&self, current: &WebVitalsSnapshot, current_fps: Option<f64>) -> Vec<MetricDelta> {
        let Some(baseline) = &self.baseline else {
            return Vec::new();
        };

        let mut deltas = Vec::new();
        for vital in REGRESSION_VITALS {
            let (Some(base), Some(cur)) = (
                baseline.metrics.web_vitals.get(vital),
                current.get(vital),
            ) else {
                continue;
            };
            if base == 0.0 {
                continue;
            }
            deltas.push(MetricDelta {
                metric: vital.as_str().to_string(),
                baseline: base,
                current: cur,
                percent_change: (cur - base) / base * 100.0,
            });
        }

        let baseline_fps = baseline
            .metrics
            .frame_timing_stats
            .as_ref()
            .map(|f| f.average_fps);
        if let (Some(base), Some(cur)) = (baseline_fps, current_fps) {
            if base != 0.0 {
                deltas.push(MetricDelta {
                    metric: "fps".to_string(),
                    baseline: base,
                    current: cur,
                    percent_change: (cur - base) / base * 100.0,
                });
            }
        }

        deltas
    }
}

fn is_regression(delta: &MetricDelta) -> bool {
    if delta.metric == "fps" {
        // Higher FPS is better: a drop is the regression direction.
        -delta.percent_change > FPS_REGRESSION_THRESHOLD_PERCENT
    } else {
        delta.percent_change > WEB_VITALS_REGRESSION_THRESHOLD_PERCENT
    }
}

fn is_improvement(delta: &MetricDelta) -> bool {
    if delta.metric == "fps" {
        delta.percent_change > FPS_REGRESSION_THRESHOLD_PERCENT
    } else {
        -delta.percent_change > WEB_VITALS_REGRESSION_THRESHOLD_PERCENT
    }
}
