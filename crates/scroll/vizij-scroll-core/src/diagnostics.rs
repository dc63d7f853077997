//! Debug telemetry: per-tick timings averaged over a fixed window of ticks.

use std::time::Duration;

/// Collects tick durations and reports a rolling average once per window.
#[derive(Debug, Clone)]
pub struct Telemetry {
    enabled: bool,
    window: u64,
    frame_lengths: Vec<Duration>,
    last_average_ms: Option<u64>,
}

impl Telemetry {
    pub fn new(enabled: bool, window: u64) -> Self {
        Self {
            enabled,
            window: window.max(1),
            frame_lengths: Vec::new(),
            last_average_ms: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Record the duration of tick `frame`. On window boundaries, returns the
    /// ceiling of the average over the window in milliseconds and starts a new window.
    pub fn record(&mut self, frame: u64, elapsed: Duration) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        self.frame_lengths.push(elapsed);
        if frame % self.window != 0 {
            return None;
        }
        let total: Duration = self.frame_lengths.drain(..).sum();
        let avg_ms = (total.as_secs_f64() * 1000.0 / self.window as f64).ceil() as u64;
        self.last_average_ms = Some(avg_ms);
        log::info!("Average frame calculation time: {avg_ms}ms");
        Some(avg_ms)
    }

    pub fn last_average_ms(&self) -> Option<u64> {
        self.last_average_ms
    }
}
