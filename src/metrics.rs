// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring task throughput

use crate::models::TaskSlot;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Process-wide task metrics
///
/// Uses atomic operations so workers can record without locks. The binary
/// logs a summary on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Tasks spawned, per slot (indexed by `TaskSlot::index`)
    tasks_started: [AtomicUsize; 4],

    /// Tasks that finished with a success payload
    pub tasks_succeeded: AtomicUsize,

    /// Tasks that finished with a failure payload
    pub tasks_failed: AtomicUsize,

    /// Distinct emails published by successful loads
    pub emails_loaded: AtomicU64,

    /// Emails written by successful exports
    pub emails_exported: AtomicU64,

    /// Progress notifications delivered to the event channel
    pub progress_sent: AtomicU64,

    /// Progress notifications dropped because the channel was full
    pub progress_dropped: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tasks_started: Default::default(),
            tasks_succeeded: AtomicUsize::new(0),
            tasks_failed: AtomicUsize::new(0),
            emails_loaded: AtomicU64::new(0),
            emails_exported: AtomicU64::new(0),
            progress_sent: AtomicU64::new(0),
            progress_dropped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_task_started(&self, slot: TaskSlot) {
        self.tasks_started[slot.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_succeeded(&self) {
        self.tasks_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emails_loaded(&self, count: usize) {
        self.emails_loaded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_emails_exported(&self, count: usize) {
        self.emails_exported.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_progress_sent(&self) {
        self.progress_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_progress_dropped(&self) {
        self.progress_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tasks_started(&self, slot: TaskSlot) -> usize {
        self.tasks_started[slot.index()].load(Ordering::Relaxed)
    }

    pub fn total_tasks_started(&self) -> usize {
        TaskSlot::ALL.iter().map(|slot| self.tasks_started(*slot)).sum()
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Task Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        for slot in TaskSlot::ALL {
            tracing::info!("{}: {} started", slot, self.tasks_started(slot));
        }
        tracing::info!(
            "Tasks: {} succeeded, {} failed",
            self.tasks_succeeded.load(Ordering::Relaxed),
            self.tasks_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Emails: {} loaded, {} exported",
            self.emails_loaded.load(Ordering::Relaxed),
            self.emails_exported.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Progress events: {} sent, {} dropped",
            self.progress_sent.load(Ordering::Relaxed),
            self.progress_dropped.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
