//! Animation frame timing and smoothness statistics

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::alerts::AlertEngine;
use crate::budgets::PerformanceBudget;
use crate::types::{Alert, AlertType, AnimationStat, FrameTimingStats, Severity};

/// 60fps frame budget in milliseconds
pub const FRAME_BUDGET_MS: f64 = 16.67;

/// Durations retained per animation name
pub const ANIMATION_RING_CAP: usize = 20;

/// Raw frame timings retained for smoothness scoring
pub const FRAME_RING_CAP: usize = 100;

/// Records duration and FPS for named, possibly-repeating animations
///
/// Each animation name accumulates into its own bounded ring buffer; every
/// tracked duration also lands in a shared frame-timing ring used for the
/// global smoothness score. Buffers are FIFO with fixed capacity.
pub struct FrameTracker {
    animations: Mutex<BTreeMap<String, VecDeque<f64>>>,
    frame_times: Mutex<VecDeque<f64>>,
    engine: Arc<AlertEngine>,
    max_animation_duration_ms: f64,
}

impl FrameTracker {
    pub fn new(engine: Arc<AlertEngine>, budget: &PerformanceBudget) -> Self {
        Self {
            animations: Mutex::new(BTreeMap::new()),
            frame_times: Mutex::new(VecDeque::with_capacity(FRAME_RING_CAP)),
            engine,
            max_animation_duration_ms: budget.max_animation_duration_ms,
        }
    }

    /// Record one animation run
    ///
    /// Duplicate names accumulate into the same bucket; no uniqueness is
    /// required. A duration over the 60fps budget raises an
    /// `AnimationJanky` alert, critical when the effective FPS drops
    /// below 30.
    pub fn track_animation(&self, name: &str, start_ms: f64, end_ms: f64, frame_count: u32) {
        let duration = (end_ms - start_ms).max(0.0);
        let fps = if duration > 0.0 {
            f64::from(frame_count) / (duration / 1000.0)
        } else {
            0.0
        };

        {
            let mut animations = self.animations.lock();
            let ring = animations.entry(name.to_string()).or_default();
            ring.push_back(duration);
            while ring.len() > ANIMATION_RING_CAP {
                ring.pop_front();
            }
        }
        {
            let mut frames = self.frame_times.lock();
            frames.push_back(duration);
            while frames.len() > FRAME_RING_CAP {
                frames.pop_front();
            }
        }

        if duration > FRAME_BUDGET_MS {
            let severity = if fps < 30.0 {
                Severity::Critical
            } else {
                Severity::Medium
            };
            debug!(name, duration, fps, "janky animation frame");
            self.engine.raise(Alert::new(
                AlertType::AnimationJanky,
                severity,
                name,
                FRAME_BUDGET_MS,
                duration,
                format!("animation '{name}' dropped below 60fps ({fps:.1}fps)"),
                "shorten the animation or move work off the main thread",
            ));
        }
    }

    /// Statistics for one animation, or `None` if it was never tracked
    pub fn animation_stats(&self, name: &str) -> Option<AnimationStat> {
        let animations = self.animations.lock();
        let ring = animations.get(name)?;
        Some(self.stat_from_ring(name, ring))
    }

    /// Statistics for every tracked animation, ordered by name
    pub fn all_animation_stats(&self) -> Vec<AnimationStat> {
        let animations = self.animations.lock();
        animations
            .iter()
            .map(|(name, ring)| self.stat_from_ring(name, ring))
            .collect()
    }

    /// Aggregates over the shared frame-timing ring, or `None` when no
    /// frames have been recorded
    pub fn frame_timing_stats(&self) -> Option<FrameTimingStats> {
        let frames = self.frame_times.lock();
        if frames.is_empty() {
            return None;
        }

        let mut sorted: Vec<f64> = frames.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let average = sorted.iter().sum::<f64>() / count as f64;
        let dropped = sorted.iter().filter(|&&d| d > FRAME_BUDGET_MS).count();

        Some(FrameTimingStats {
            average_frame_time: average,
            average_fps: if average > 0.0 { 1000.0 / average } else { 0.0 },
            p95_frame_time: percentile(&sorted, 95.0),
            p99_frame_time: percentile(&sorted, 99.0),
            dropped_frames: dropped,
            smoothness_score: (count - dropped) as f64 / count as f64 * 100.0,
        })
    }

    fn stat_from_ring(&self, name: &str, ring: &VecDeque<f64>) -> AnimationStat {
        let mut sorted: Vec<f64> = ring.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let average = if count > 0 {
            sorted.iter().sum::<f64>() / count as f64
        } else {
            0.0
        };

        AnimationStat {
            name: name.to_string(),
            average,
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            p95: percentile(&sorted, 95.0),
            count,
            avg_fps: if average > 0.0 { 1000.0 / average } else { 0.0 },
            budget_compliant: average <= self.max_animation_duration_ms,
        }
    }
}

/// Linear-interpolation percentile over an ascending-sorted slice
///
/// `index = p/100 * (len - 1)`, interpolating between the two neighboring
/// ranks. For `[10, 20, 30, 40, 50]` p95 is `40 + 0.8 * (50 - 40) = 48`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let index = p / 100.0 * (len - 1) as f64;
            let lo = index.floor() as usize;
            let hi = index.ceil() as usize;
            if lo == hi {
                sorted[lo]
            } else {
                sorted[lo] + (index - lo as f64) * (sorted[hi] - sorted[lo])
            }
        }
    }
}
