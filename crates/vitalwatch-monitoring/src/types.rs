//! Core types for the monitoring pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for alert events
pub type EventId = Uuid;

/// Severity levels for alerts and budget violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Standardized web vital metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebVital {
    Lcp,
    Fid,
    Cls,
    Tti,
    Ttfb,
    Fcp,
    Tbt,
    Fmp,
}

impl WebVital {
    /// All vitals, in reporting order
    pub const ALL: [WebVital; 8] = [
        WebVital::Lcp,
        WebVital::Fid,
        WebVital::Cls,
        WebVital::Tti,
        WebVital::Ttfb,
        WebVital::Fcp,
        WebVital::Tbt,
        WebVital::Fmp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebVital::Lcp => "LCP",
            WebVital::Fid => "FID",
            WebVital::Cls => "CLS",
            WebVital::Tti => "TTI",
            WebVital::Ttfb => "TTFB",
            WebVital::Fcp => "FCP",
            WebVital::Tbt => "TBT",
            WebVital::Fmp => "FMP",
        }
    }

    /// Unit the vital is measured in; CLS is a unitless score
    pub fn unit(&self) -> MetricUnit {
        match self {
            WebVital::Cls => MetricUnit::Score,
            _ => MetricUnit::Milliseconds,
        }
    }
}

impl std::fmt::Display for WebVital {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Measurement units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Milliseconds,
    Megabytes,
    Fps,
    Score,
    Count,
}

/// One immutable metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64, unit: MetricUnit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            timestamp: Utc::now(),
        }
    }
}

/// Latest observed value per web vital
///
/// Idempotent overwrite semantics: recording a vital replaces the previous
/// value, it never accumulates duplicates. Callers always receive clones,
/// never a live reference into the sampler's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebVitalsSnapshot {
    values: HashMap<WebVital, f64>,
}

impl WebVitalsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vital: WebVital) -> Option<f64> {
        self.values.get(&vital).copied()
    }

    pub fn set(&mut self, vital: WebVital, value: f64) {
        self.values.insert(vital, value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Vitals present in this snapshot, in `WebVital::ALL` order
    pub fn observed(&self) -> Vec<(WebVital, f64)> {
        WebVital::ALL
            .iter()
            .filter_map(|v| self.get(*v).map(|value| (*v, value)))
            .collect()
    }
}

/// Alert categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    BudgetExceeded,
    AnimationJanky,
    MemoryLeak,
    CriticalError,
}

/// A structured performance alert
///
/// Never mutated after creation. Budget breaches are expected, structured
/// output, not software faults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: EventId,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub metric: String,
    pub threshold: f64,
    pub actual: f64,
    pub impact: String,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        metric: impl Into<String>,
        threshold: f64,
        actual: f64,
        impact: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new_v4(),
            alert_type,
            severity,
            metric: metric.into(),
            threshold,
            actual,
            impact: impact.into(),
            recommendation: recommendation.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate statistics over one animation's duration ring buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationStat {
    pub name: String,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub count: usize,
    pub avg_fps: f64,
    pub budget_compliant: bool,
}

/// Aggregate statistics over the shared frame-timing ring buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTimingStats {
    pub average_frame_time: f64,
    pub average_fps: f64,
    pub p95_frame_time: f64,
    pub p99_frame_time: f64,
    pub dropped_frames: usize,
    /// Percentage of frames at or under the 60fps budget, 0..=100
    pub smoothness_score: f64,
}

/// Running counters over observed resource-timing entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStats {
    pub count: usize,
    pub total_transfer_bytes: u64,
    pub slowest_duration_ms: f64,
    pub slowest_name: Option<String>,
}
