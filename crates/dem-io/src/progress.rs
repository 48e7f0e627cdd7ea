//! Progress and timing collaborators.
//!
//! Every encoder and decoder takes a [`ProgressReporter`] explicitly, so
//! callers decide whether progress is logged, collected or ignored.

use std::time::{Duration, Instant};

use tracing::debug;

/// Receives progress updates while a grid is streamed.
pub trait ProgressReporter {
    /// Begin a run over `total` cells.
    fn start(&mut self, total: usize);

    /// Report that `current` cells have been processed.
    fn update(&mut self, current: usize);

    /// Finish the run and return the time it took.
    fn stop(&mut self) -> Duration;
}

/// Stopwatch that accumulates time over several start/stop spans.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer that is already running.
    pub fn started() -> Self {
        let mut timer = Self::new();
        timer.start();
        timer
    }

    /// Start a new span. Has no effect if the timer is already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Close the current span and return the accumulated time.
    pub fn stop(&mut self) -> Duration {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += started_at.elapsed();
        }
        self.accumulated
    }

    /// Total time across all spans, including a running one.
    pub fn accumulated(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self.accumulated + started_at.elapsed(),
            None => self.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

/// Reporter that records nothing but elapsed time.
#[derive(Debug, Default)]
pub struct NoProgress {
    timer: Timer,
}

impl NoProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for NoProgress {
    fn start(&mut self, _total: usize) {
        self.timer = Timer::started();
    }

    fn update(&mut self, _current: usize) {}

    fn stop(&mut self) -> Duration {
        self.timer.stop()
    }
}

/// Reporter that emits a `debug!` event each time another tenth of the
/// work is done.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    total: usize,
    next_percent: usize,
    timer: Timer,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            next_percent: 0,
            timer: Timer::new(),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new("grid")
    }
}

impl ProgressReporter for LogProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.next_percent = 10;
        self.timer = Timer::started();
        debug!(label = %self.label, total, "Started");
    }

    fn update(&mut self, current: usize) {
        if self.total == 0 {
            return;
        }

        let percent = current.min(self.total) * 100 / self.total;
        if percent >= self.next_percent {
            debug!(label = %self.label, current, total = self.total, percent, "Progress");
            self.next_percent = (percent / 10 + 1) * 10;
        }
    }

    fn stop(&mut self) -> Duration {
        let elapsed = self.timer.stop();
        debug!(
            label = %self.label,
            total = self.total,
            elapsed_ms = elapsed.as_millis() as u64,
            "Finished"
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_accumulates_spans() {
        let mut timer = Timer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.accumulated(), Duration::ZERO);

        timer.start();
        std::thread::sleep(Duration::from_millis(2));
        let first = timer.stop();
        assert!(first >= Duration::from_millis(2));

        timer.start();
        std::thread::sleep(Duration::from_millis(2));
        let second = timer.stop();
        assert!(second >= first + Duration::from_millis(2));
        assert_eq!(timer.accumulated(), second);
    }

    #[test]
    fn test_log_progress_steps() {
        let mut progress = LogProgress::new("test");
        progress.start(200);
        progress.update(0);
        assert_eq!(progress.next_percent, 10);
        progress.update(50);
        assert_eq!(progress.next_percent, 30);
        progress.update(199);
        assert_eq!(progress.next_percent, 100);
        progress.stop();
    }

    #[test]
    fn test_log_progress_empty_run() {
        let mut progress = LogProgress::default();
        progress.start(0);
        progress.update(0);
        progress.stop();
    }
}
