//! Web vitals sampling from typed performance-entry events
//!
//! Browser observation APIs are modeled as a producer/consumer boundary:
//! the host page (or a test harness) produces `PerformanceEntry` events on
//! an mpsc channel, and the sampler consumes them into the current
//! `WebVitalsSnapshot`. The scoring and regression layers stay pure and
//! never touch the observation mechanism.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::alerts::AlertEngine;
use crate::budgets::{vital_violation_severity, PerformanceBudget};
use crate::types::{Alert, AlertType, MetricSample, ResourceStats, WebVital, WebVitalsSnapshot};

/// Raw observations retained in the sample log
pub const SAMPLE_LOG_CAP: usize = 100;

/// One observed performance event, as delivered by the host environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entryType", rename_all = "kebab-case")]
pub enum PerformanceEntry {
    #[serde(rename_all = "camelCase")]
    Navigation { ttfb_ms: f64, tti_ms: f64 },
    #[serde(rename_all = "camelCase")]
    Paint { first_contentful_paint_ms: f64 },
    #[serde(rename_all = "camelCase")]
    LargestContentfulPaint { render_time_ms: f64 },
    #[serde(rename_all = "camelCase")]
    FirstInput { delay_ms: f64 },
    #[serde(rename_all = "camelCase")]
    LayoutShift { value: f64 },
    #[serde(rename_all = "camelCase")]
    Resource {
        name: String,
        duration_ms: f64,
        transfer_size_bytes: u64,
    },
}

/// Maintains the current web vitals snapshot and resource counters
pub struct VitalsSampler {
    vitals: Mutex<WebVitalsSnapshot>,
    samples: Mutex<VecDeque<MetricSample>>,
    resources: Mutex<ResourceStats>,
    engine: Arc<AlertEngine>,
    budget: PerformanceBudget,
    observer: Mutex<Option<JoinHandle<()>>>,
}

impl VitalsSampler {
    pub fn new(engine: Arc<AlertEngine>, budget: PerformanceBudget) -> Self {
        Self {
            vitals: Mutex::new(WebVitalsSnapshot::new()),
            samples: Mutex::new(VecDeque::with_capacity(SAMPLE_LOG_CAP)),
            resources: Mutex::new(ResourceStats::default()),
            engine,
            budget,
            observer: Mutex::new(None),
        }
    }

    /// Consume entries from `receiver` until the channel closes
    ///
    /// Idempotent: a second call while an observer task is alive is a
    /// no-op. Entry kinds the host never delivers simply leave their
    /// vitals absent; partial data is not an error.
    pub fn start_observing(self: &Arc<Self>, mut receiver: mpsc::Receiver<PerformanceEntry>) {
        let mut observer = self.observer.lock();
        if observer.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("performance observer already running");
            return;
        }

        let sampler = Arc::clone(self);
        *observer = Some(tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                sampler.ingest(entry);
            }
            debug!("performance entry channel closed");
        }));
    }

    /// Stop the observer task, if any
    pub fn stop(&self) {
        if let Some(task) = self.observer.lock().take() {
            task.abort();
        }
    }

    /// Apply one entry to the snapshot synchronously
    pub fn ingest(&self, entry: PerformanceEntry) {
        match entry {
            PerformanceEntry::Navigation { ttfb_ms, tti_ms } => {
                self.record_vital(WebVital::Ttfb, ttfb_ms);
                self.record_vital(WebVital::Tti, tti_ms);
            }
            PerformanceEntry::Paint {
                first_contentful_paint_ms,
            } => {
                self.record_vital(WebVital::Fcp, first_contentful_paint_ms);
            }
            PerformanceEntry::LargestContentfulPaint { render_time_ms } => {
                self.record_vital(WebVital::Lcp, render_time_ms);
            }
            PerformanceEntry::FirstInput { delay_ms } => {
                self.record_vital(WebVital::Fid, delay_ms);
            }
            PerformanceEntry::LayoutShift { value } => {
                // Layout shifts are cumulative: each shift adds to CLS.
                let cls = self.vitals.lock().get(WebVital::Cls).unwrap_or(0.0) + value;
                self.record_vital(WebVital::Cls, cls);
            }
            PerformanceEntry::Resource {
                name,
                duration_ms,
                transfer_size_bytes,
            } => {
                let mut resources = self.resources.lock();
                resources.count += 1;
                resources.total_transfer_bytes += transfer_size_bytes;
                if duration_ms > resources.slowest_duration_ms {
                    resources.slowest_duration_ms = duration_ms;
                    resources.slowest_name = Some(name);
                }
            }
        }
    }

    /// Overwrite the snapshot entry for `vital`
    ///
    /// If the new value breaches the active budget for that vital, a
    /// `BudgetExceeded` alert is raised synchronously, in the same tick.
    pub fn record_vital(&self, vital: WebVital, value: f64) {
        self.vitals.lock().set(vital, value);
        {
            let mut samples = self.samples.lock();
            samples.push_back(MetricSample::new(vital.as_str(), value, vital.unit()));
            while samples.len() > SAMPLE_LOG_CAP {
                samples.pop_front();
            }
        }

        if let Some(ceiling) = self.budget.vital_ceiling(vital) {
            if value > ceiling {
                self.engine.raise(Alert::new(
                    AlertType::BudgetExceeded,
                    vital_violation_severity(vital),
                    vital.as_str(),
                    ceiling,
                    value,
                    vital_impact(vital),
                    vital_recommendation(vital),
                ));
            }
        }
    }

    /// Immutable copy of the current vitals
    pub fn snapshot(&self) -> WebVitalsSnapshot {
        self.vitals.lock().clone()
    }

    /// The raw observation trail, oldest first
    pub fn recent_samples(&self) -> Vec<MetricSample> {
        self.samples.lock().iter().cloned().collect()
    }

    /// Immutable copy of the resource counters
    pub fn resource_stats(&self) -> ResourceStats {
        self.resources.lock().clone()
    }
}

fn vital_impact(vital: WebVital) -> &'static str {
    match vital {
        WebVital::Lcp => "users wait longer before the main content is visible",
        WebVital::Fid => "the page feels unresponsive to the first interaction",
        WebVital::Cls => "content jumps around while users read or tap",
        WebVital::Tti => "the page looks ready before it can respond to input",
        WebVital::Ttfb => "every later milestone is delayed by slow server response",
        WebVital::Fcp => "users stare at a blank screen longer",
        WebVital::Tbt => "long tasks block input handling",
        WebVital::Fmp => "meaningful content appears late",
    }
}

fn vital_recommendation(vital: WebVital) -> &'static str {
    match vital {
        WebVital::Lcp => "preload the hero image and inline critical CSS",
        WebVital::Fid => "break up long tasks and defer non-essential scripts",
        WebVital::Cls => "reserve space for late-loading media and embeds",
        WebVital::Tti => "reduce main-thread work during startup",
        WebVital::Ttfb => "cache server responses or move content to a CDN",
        WebVital::Fcp => "eliminate render-blocking resources",
        WebVital::Tbt => "split long tasks into smaller chunks",
        WebVital::Fmp => "prioritize above-the-fold content",
    }
}
