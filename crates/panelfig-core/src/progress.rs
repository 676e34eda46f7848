#![forbid(unsafe_code)]

//! Advisory progress reporting for long-running work.
//!
//! Sinks are called from worker threads and must return quickly. Nothing a
//! sink does can influence the numerical result of the work it observes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Rows completed out of the total scheduled for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub done: u64,
    pub total: u64,
}

impl Progress {
    #[must_use]
    pub const fn new(done: u64, total: u64) -> Self {
        Self { done, total }
    }

    /// Completed fraction in `[0, 1]`; an empty run counts as complete.
    #[must_use]
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done.min(self.total) as f64) / (self.total as f64)
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.done >= self.total
    }
}

/// Receiver of progress updates.
pub trait ProgressSink: Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress);
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Shared counters readable from another thread while work is running.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    done: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
}

impl ProgressCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest reported progress.
    #[must_use]
    pub fn snapshot(&self) -> Progress {
        Progress::new(
            self.done.load(Ordering::Acquire),
            self.total.load(Ordering::Acquire),
        )
    }
}

impl ProgressSink for ProgressCounter {
    fn report(&self, progress: Progress) {
        self.total.store(progress.total, Ordering::Release);
        self.done.fetch_max(progress.done, Ordering::AcqRel);
    }
}
