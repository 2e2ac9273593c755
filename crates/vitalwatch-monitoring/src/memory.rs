//! Periodic memory monitoring with leak detection

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::{Pid, System};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::alerts::AlertEngine;
use crate::budgets::PerformanceBudget;
use crate::types::{Alert, AlertType, Severity};

/// Default polling cadence
pub const DEFAULT_MEMORY_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Source of memory readings; injectable so the monitor is testable
/// without a live process table
pub trait MemoryReader: Send + 'static {
    /// Current usage in megabytes, or `None` when sampling is unavailable
    fn memory_mb(&mut self) -> Option<f64>;
}

/// Process-RSS reader backed by sysinfo
pub struct SysinfoReader {
    system: System,
    pid: Option<Pid>,
}

impl SysinfoReader {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }
}

impl Default for SysinfoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReader for SysinfoReader {
    fn memory_mb(&mut self) -> Option<f64> {
        let pid = self.pid?;
        self.system.refresh_process(pid);
        self.system
            .process(pid)
            .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
    }
}

/// Cancellable periodic memory poller
///
/// Each reading is compared against the previous one; growth beyond the
/// budget's leak threshold raises a `MemoryLeak` alert, and usage above
/// the ceiling raises `BudgetExceeded`. The poll task is tied to this
/// monitor's lifecycle: `stop()` aborts it and clears state.
pub struct MemoryMonitor {
    engine: Arc<AlertEngine>,
    budget: PerformanceBudget,
    last_reading_mb: Arc<Mutex<Option<f64>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryMonitor {
    pub fn new(engine: Arc<AlertEngine>, budget: PerformanceBudget) -> Self {
        Self {
            engine,
            budget,
            last_reading_mb: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Start polling `reader` every `interval`; idempotent while running
    pub fn start(&self, interval: Duration, mut reader: impl MemoryReader) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("memory monitor already running");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let budget = self.budget.clone();
        let last = Arc::clone(&self.last_reading_mb);
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first
            // reading happens one full interval after start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match reader.memory_mb() {
                    Some(reading) => evaluate_reading(&engine, &budget, &last, reading),
                    None => debug!("memory sampling unavailable, skipping tick"),
                }
            }
        }));
    }

    /// Abort the poll task and clear the last reading
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        *self.last_reading_mb.lock() = None;
    }

    /// Feed one reading through the leak/ceiling checks directly
    pub fn record_reading(&self, reading_mb: f64) {
        evaluate_reading(
            &self.engine,
            &self.budget,
            &self.last_reading_mb,
            reading_mb,
        );
    }

    pub fn last_reading_mb(&self) -> Option<f64> {
        *self.last_reading_mb.lock()
    }
}

fn evaluate_reading(
    engine: &AlertEngine,
    budget: &PerformanceBudget,
    last: &Mutex<Option<f64>>,
    reading_mb: f64,
) {
    let previous = last.lock().replace(reading_mb);

    if let Some(previous) = previous {
        let growth = reading_mb - previous;
        if growth > budget.memory_leak_threshold_mb {
            engine.raise(Alert::new(
                AlertType::MemoryLeak,
                Severity::High,
                "memory",
                budget.memory_leak_threshold_mb,
                growth,
                format!("heap grew {growth:.1}MB since the previous poll"),
                "look for detached DOM nodes and unreleased observers",
            ));
        }
    }

    if reading_mb > budget.max_memory_mb {
        engine.raise(Alert::new(
            AlertType::BudgetExceeded,
            Severity::Medium,
            "memory",
            budget.max_memory_mb,
            reading_mb,
            "high memory usage degrades responsiveness on constrained devices",
            "audit caches and large retained structures",
        ));
    }
}
