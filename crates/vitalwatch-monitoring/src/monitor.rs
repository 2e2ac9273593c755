//! Monitor facade wiring the collection components together
//!
//! One `VitalWatch` per running page or process, constructed explicitly by
//! the application's composition root and passed by reference to anything
//! that needs it. There is no global instance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::alerts::{AlertEngine, SubscriptionHandle};
use crate::budgets::{Environment, PerformanceBudget};
use crate::frames::FrameTracker;
use crate::memory::{MemoryMonitor, MemoryReader, SysinfoReader, DEFAULT_MEMORY_POLL_INTERVAL};
use crate::sampler::{PerformanceEntry, VitalsSampler};
use crate::types::{Alert, AnimationStat, FrameTimingStats, WebVitalsSnapshot};

/// The assembled monitoring pipeline for one page session
pub struct VitalWatch {
    environment: Environment,
    budget: PerformanceBudget,
    engine: Arc<AlertEngine>,
    sampler: Arc<VitalsSampler>,
    frames: FrameTracker,
    memory: MemoryMonitor,
}

impl VitalWatch {
    /// Build the full pipeline for `environment`
    ///
    /// Low and medium severity alerts are only logged in development.
    pub fn new(environment: Environment) -> Self {
        let budget = PerformanceBudget::for_environment(environment);
        let engine = Arc::new(AlertEngine::new(
            environment == Environment::Development,
        ));
        let sampler = Arc::new(VitalsSampler::new(Arc::clone(&engine), budget.clone()));
        let frames = FrameTracker::new(Arc::clone(&engine), &budget);
        let memory = MemoryMonitor::new(Arc::clone(&engine), budget.clone());

        Self {
            environment,
            budget,
            engine,
            sampler,
            frames,
            memory,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn budget(&self) -> &PerformanceBudget {
        &self.budget
    }

    pub fn engine(&self) -> &Arc<AlertEngine> {
        &self.engine
    }

    pub fn sampler(&self) -> &Arc<VitalsSampler> {
        &self.sampler
    }

    pub fn frames(&self) -> &FrameTracker {
        &self.frames
    }

    /// Subscribe to live alerts; the monitor assumes nothing about what
    /// the subscriber does with them
    pub fn on_alert(
        &self,
        callback: impl Fn(&Alert) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.engine.subscribe(callback)
    }

    /// Begin consuming performance entries from the host
    pub fn start_observing(&self, receiver: mpsc::Receiver<PerformanceEntry>) {
        self.sampler.start_observing(receiver);
    }

    /// Start the periodic memory poller with the default sysinfo reader
    pub fn start_memory_monitoring(&self, interval: Option<Duration>) {
        self.memory.start(
            interval.unwrap_or(DEFAULT_MEMORY_POLL_INTERVAL),
            SysinfoReader::new(),
        );
    }

    /// Start the memory poller with a custom reading source
    pub fn start_memory_monitoring_with(&self, interval: Duration, reader: impl MemoryReader) {
        self.memory.start(interval, reader);
    }

    pub fn memory(&self) -> &MemoryMonitor {
        &self.memory
    }

    pub fn snapshot(&self) -> WebVitalsSnapshot {
        self.sampler.snapshot()
    }

    pub fn animation_stats(&self) -> Vec<AnimationStat> {
        self.frames.all_animation_stats()
    }

    pub fn frame_timing_stats(&self) -> Option<FrameTimingStats> {
        self.frames.frame_timing_stats()
    }

    /// Stop the observer task and the memory poller
    pub fn shutdown(&self) {
        self.sampler.stop();
        self.memory.stop();
    }
}
