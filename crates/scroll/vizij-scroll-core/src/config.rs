//! Core configuration for vizij-scroll-core.

use serde::{Deserialize, Serialize};

/// Name of the driver registered by [`crate::Engine::init`] unless overridden.
pub const DEFAULT_FRAME_DRIVER: &str = "frame";

/// Engine-wide settings. Every field has a default; hosts usually only flip `debug`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Collect per-tick timings and log a rolling average.
    pub debug: bool,
    /// Number of ticks per telemetry average.
    pub telemetry_window: u64,
    /// Name of the built-in driver whose value is the frame counter.
    pub frame_driver: String,
    /// Damping used by drivers that do not specify their own.
    pub damping: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            telemetry_window: 60,
            frame_driver: DEFAULT_FRAME_DRIVER.to_string(),
            damping: 0.8,
        }
    }
}
