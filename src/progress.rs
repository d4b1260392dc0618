//! Best-effort progress reporting: the deepest path length the search has
//! reached so far, out of the number of sectors.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives depth updates from search workers. Called from any worker thread,
/// so implementations must be cheap and must not block on the search.
pub trait ProgressSink: Send + Sync {
    fn deepest(&self, depth: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn deepest(&self, depth: usize, total: usize) {
        self(depth, total)
    }
}

/// Forwards only strictly increasing depths to the sink.
pub struct DepthTracker {
    deepest: AtomicUsize,
    total: usize,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl DepthTracker {
    pub fn new(total: usize, sink: Option<Arc<dyn ProgressSink>>) -> Self {
        DepthTracker {
            deepest: AtomicUsize::new(0),
            total,
            sink,
        }
    }

    pub fn silent(total: usize) -> Self {
        Self::new(total, None)
    }

    #[inline]
    pub fn observe(&self, depth: usize) {
        let Some(sink) = &self.sink else {
            return;
        };
        if depth <= self.deepest.load(Ordering::Relaxed) {
            return;
        }
        let previous = self.deepest.fetch_max(depth, Ordering::Relaxed);
        if depth > previous {
            sink.deepest(depth, self.total);
        }
    }

    pub fn deepest(&self) -> usize {
        self.deepest.load(Ordering::Relaxed)
    }
}

/// Terminal progress bar driven by depth updates.
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} depth {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        ProgressBarSink { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ProgressBarSink {
    fn deepest(&self, depth: usize, _total: usize) {
        self.bar.set_position(depth as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_tracker_reports_strict_increases_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = move |depth: usize, total: usize| {
            sink_seen.lock().unwrap().push((depth, total));
        };
        let tracker = DepthTracker::new(6, Some(Arc::new(sink)));
        for depth in [2, 1, 3, 3, 2, 5] {
            tracker.observe(depth);
        }
        assert_eq!(*seen.lock().unwrap(), vec![(2, 6), (3, 6), (5, 6)]);
        assert_eq!(tracker.deepest(), 5);
    }

    #[test]
    fn test_silent_tracker_records_nothing() {
        let tracker = DepthTracker::silent(4);
        tracker.observe(3);
        assert_eq!(tracker.deepest(), 0);
    }
}
