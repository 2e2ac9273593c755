//! Real-time client performance monitoring for VitalWatch
//!
//! This crate provides the collection side of the VitalWatch pipeline:
//! - Web vitals sampling from typed performance-entry events
//! - Animation frame timing with jank detection
//! - Central alert engine with bounded history and subscriber fan-out
//! - Periodic memory monitoring with leak detection
//! - Per-environment performance budgets

pub mod alerts;
pub mod budgets;
pub mod error;
pub mod frames;
pub mod memory;
pub mod monitor;
pub mod sampler;
pub mod types;

pub use alerts::{AlertEngine, SubscriptionHandle, ALERT_HISTORY_CAP};
pub use budgets::{vital_violation_severity, Environment, PerformanceBudget};
pub use error::{MonitoringError, Result};
pub use frames::{FrameTracker, ANIMATION_RING_CAP, FRAME_BUDGET_MS, FRAME_RING_CAP};
pub use memory::{MemoryMonitor, MemoryReader, SysinfoReader, DEFAULT_MEMORY_POLL_INTERVAL};
pub use monitor::VitalWatch;
pub use sampler::{PerformanceEntry, VitalsSampler, SAMPLE_LOG_CAP};
pub use types::{
    Alert, AlertType, AnimationStat, FrameTimingStats, MetricSample, MetricUnit, ResourceStats,
    Severity, WebVital, WebVitalsSnapshot,
};
