//! Central alert emission, bounded history, and subscriber fan-out

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::types::{Alert, Severity};

/// Maximum number of alerts retained; oldest evicted first
pub const ALERT_HISTORY_CAP: usize = 50;

type AlertCallback = Arc<dyn Fn(&Alert) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: AlertCallback,
}

/// Central alert engine
///
/// Owns the bounded alert history and the subscriber registry. Subscribers
/// are notified synchronously in subscription order; a panicking subscriber
/// is isolated and never blocks the rest.
pub struct AlertEngine {
    history: Mutex<VecDeque<Alert>>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    development_mode: bool,
}

impl AlertEngine {
    pub fn new(development_mode: bool) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(ALERT_HISTORY_CAP)),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(0),
            development_mode,
        }
    }

    /// Append to history and notify every subscriber
    pub fn raise(&self, alert: Alert) {
        {
            let mut history = self.history.lock();
            history.push_back(alert.clone());
            while history.len() > ALERT_HISTORY_CAP {
                history.pop_front();
            }
        }

        match alert.severity {
            Severity::Critical => error!(
                metric = %alert.metric,
                threshold = alert.threshold,
                actual = alert.actual,
                "critical performance alert"
            ),
            Severity::High => warn!(
                metric = %alert.metric,
                threshold = alert.threshold,
                actual = alert.actual,
                "performance alert"
            ),
            _ => {
                if self.development_mode {
                    info!(
                        metric = %alert.metric,
                        threshold = alert.threshold,
                        actual = alert.actual,
                        "performance alert"
                    );
                }
            }
        }

        // Snapshot the callbacks so a subscriber adding or removing
        // subscriptions from inside its callback cannot deadlock.
        let callbacks: Vec<AlertCallback> = self
            .subscribers
            .lock()
            .iter()
            .map(|s| Arc::clone(&s.callback))
            .collect();

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&alert))).is_err() {
                warn!(metric = %alert.metric, "alert subscriber panicked, skipping");
            }
        }
    }

    /// Register a callback invoked for every subsequent alert
    pub fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(&Alert) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        SubscriptionHandle {
            id,
            engine: Arc::downgrade(self),
        }
    }

    /// Alerts whose timestamp falls within `now - window ..= now`, in
    /// original arrival order
    pub fn recent_alerts(&self, window: TimeDelta) -> Vec<Alert> {
        let cutoff = Utc::now()
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.history
            .lock()
            .iter()
            .filter(|a| a.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }
}

/// Disposer for one subscription; removes exactly that registration
pub struct SubscriptionHandle {
    id: u64,
    engine: Weak<AlertEngine>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.unsubscribe(self.id);
        }
    }
}
