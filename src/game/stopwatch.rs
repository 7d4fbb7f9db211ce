//! Monotonic elapsed-time accumulator.
//!
//! A stopwatch that survives start/stop cycles without drifting or double
//! counting: stopped time freezes the accumulated total, and resuming adds
//! on top of it. Readings use `std::time::Instant`, so wall-clock
//! adjustments cannot corrupt a running session.

use std::time::{Duration, Instant};

/// Accumulating stopwatch over a monotonic clock.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    /// Total accumulated across completed run intervals.
    accumulated: Duration,
    /// Start of the current run interval, when running.
    started_at: Option<Instant>,
}

impl Stopwatch {
    /// Creates a stopped stopwatch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts or resumes accumulation. Idempotent while running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Stops accumulation, folding the current interval into the total.
    /// Idempotent while stopped.
    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += started_at.elapsed();
        }
    }

    /// Stops and clears the accumulated total.
    pub fn reset(&mut self) {
        self.stop();
        self.accumulated = Duration::ZERO;
    }

    /// Returns the accumulated total, including the in-progress interval
    /// when running. Never decreases while running.
    pub fn read(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self.accumulated + started_at.elapsed(),
            None => self.accumulated,
        }
    }

    /// Returns whether the stopwatch is accumulating.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

/// Formats a duration as `HH:MM:SS.cc` (centisecond precision).
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let centis = elapsed.subsec_millis() / 10;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}
