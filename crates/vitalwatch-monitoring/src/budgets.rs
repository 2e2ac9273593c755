//! Per-environment performance budgets
//!
//! Exactly four canonical profiles with monotonically tightening thresholds
//! from development down to clinical. A budget is selected once at startup
//! and never mutated afterward.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MonitoringError;
use crate::types::{Severity, WebVital};

/// Deployment environment a budget profile applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
    Clinical,
}

impl Environment {
    /// Resolve from the `VITALWATCH_ENV` variable, defaulting to production
    pub fn from_env() -> Self {
        std::env::var("VITALWATCH_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = MonitoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            "clinical" => Ok(Environment::Clinical),
            other => Err(MonitoringError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
            Environment::Clinical => write!(f, "clinical"),
        }
    }
}

/// Numeric ceilings and floors every tracked metric must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceBudget {
    pub max_lcp_ms: f64,
    pub max_fid_ms: f64,
    pub max_cls: f64,
    pub max_tti_ms: f64,
    pub max_ttfb_ms: f64,
    pub max_animation_duration_ms: f64,
    pub max_frame_time_ms: f64,
    pub min_fps: f64,
    pub max_memory_mb: f64,
    /// Heap growth per memory-poll interval treated as a leak
    pub memory_leak_threshold_mb: f64,
}

impl PerformanceBudget {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                max_lcp_ms: 4000.0,
                max_fid_ms: 300.0,
                max_cls: 0.25,
                max_tti_ms: 5000.0,
                max_ttfb_ms: 800.0,
                max_animation_duration_ms: 300.0,
                max_frame_time_ms: 33.34,
                min_fps: 30.0,
                max_memory_mb: 512.0,
                memory_leak_threshold_mb: 5.0,
            },
            Environment::Staging => Self {
                max_lcp_ms: 3000.0,
                max_fid_ms: 200.0,
                max_cls: 0.15,
                max_tti_ms: 4000.0,
                max_ttfb_ms: 600.0,
                max_animation_duration_ms: 250.0,
                max_frame_time_ms: 25.0,
                min_fps: 45.0,
                max_memory_mb: 384.0,
                memory_leak_threshold_mb: 5.0,
            },
            Environment::Production => Self {
                max_lcp_ms: 2500.0,
                max_fid_ms: 100.0,
                max_cls: 0.1,
                max_tti_ms: 3500.0,
                max_ttfb_ms: 500.0,
                max_animation_duration_ms: 200.0,
                max_frame_time_ms: 16.67,
                min_fps: 55.0,
                max_memory_mb: 256.0,
                memory_leak_threshold_mb: 5.0,
            },
            Environment::Clinical => Self {
                max_lcp_ms: 1000.0,
                max_fid_ms: 50.0,
                max_cls: 0.1,
                max_tti_ms: 2000.0,
                max_ttfb_ms: 300.0,
                max_animation_duration_ms: 150.0,
                max_frame_time_ms: 16.67,
                min_fps: 60.0,
                max_memory_mb: 192.0,
                memory_leak_threshold_mb: 5.0,
            },
        }
    }

    /// Ceiling for a budgeted vital; FCP, TBT, and FMP carry no budget entry
    pub fn vital_ceiling(&self, vital: WebVital) -> Option<f64> {
        match vital {
            WebVital::Lcp => Some(self.max_lcp_ms),
            WebVital::Fid => Some(self.max_fid_ms),
            WebVital::Cls => Some(self.max_cls),
            WebVital::Tti => Some(self.max_tti_ms),
            WebVital::Ttfb => Some(self.max_ttfb_ms),
            WebVital::Fcp | WebVital::Tbt | WebVital::Fmp => None,
        }
    }
}

/// Severity a breach of the given vital's budget is reported at
pub fn vital_violation_severity(vital: WebVital) -> Severity {
    match vital {
        WebVital::Fid => Severity::Critical,
        WebVital::Lcp | WebVital::Tti => Severity::High,
        _ => Severity::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_canonical_names() {
        assert_eq!(
            "clinical".parse::<Environment>().unwrap(),
            Environment::Clinical
        );
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn budgets_tighten_toward_clinical() {
        let dev = PerformanceBudget::for_environment(Environment::Development);
        let staging = PerformanceBudget::for_environment(Environment::Staging);
        let prod = PerformanceBudget::for_environment(Environment::Production);
        let clinical = PerformanceBudget::for_environment(Environment::Clinical);

        for pair in [(&dev, &staging), (&staging, &prod), (&prod, &clinical)] {
            let (looser, tighter) = pair;
            assert!(tighter.max_lcp_ms <= looser.max_lcp_ms);
            assert!(tighter.max_fid_ms <= looser.max_fid_ms);
            assert!(tighter.max_cls <= looser.max_cls);
            assert!(tighter.max_tti_ms <= looser.max_tti_ms);
            assert!(tighter.max_ttfb_ms <= looser.max_ttfb_ms);
            assert!(tighter.max_frame_time_ms <= looser.max_frame_time_ms);
            assert!(tighter.min_fps >= looser.min_fps);
            assert!(tighter.max_memory_mb <= looser.max_memory_mb);
        }
    }

    #[test]
    fn clinical_budget_matches_reference_thresholds() {
        let budget = PerformanceBudget::for_environment(Environment::Clinical);
        assert_eq!(budget.max_lcp_ms, 1000.0);
        assert_eq!(budget.max_fid_ms, 50.0);
        assert_eq!(budget.max_cls, 0.1);
        assert_eq!(budget.min_fps, 60.0);
    }

    #[test]
    fn unbudgeted_vitals_have_no_ceiling() {
        let budget = PerformanceBudget::for_environment(Environment::Production);
        assert!(budget.vital_ceiling(WebVital::Fcp).is_none());
        assert!(budget.vital_ceiling(WebVital::Tbt).is_none());
        assert!(budget.vital_ceiling(WebVital::Fmp).is_none());
    }
}
