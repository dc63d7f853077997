//! Drivers: named scalar signals sampled once per tick, with a smoothed momentum estimate.
//!
//! Momentum is a two-stage exponential moving average of the per-sample delta:
//!   m1 = m1 * damping + delta * (1 - damping)
//!   m2 = m2 * damping + m1 * (1 - damping)
//!   momentum = round(m2 * 5000) / 10000

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Viewport;

/// Inputs available to a value producer when it is sampled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleContext {
    pub tick: u64,
    pub viewport: Viewport,
}

/// Value producer for a driver. Producers that only need a captured source may ignore the context.
pub type ValueFn = Box<dyn FnMut(&SampleContext) -> f64>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MomentumMode {
    #[default]
    Off,
    /// Signed momentum.
    Relative,
    /// Magnitude only.
    Absolute,
}

/// Per-driver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverOptions {
    /// Sample every Nth tick; 0 behaves as 1.
    pub frame_step: u64,
    pub momentum: MomentumMode,
    /// Overrides [`crate::Config::damping`] when set.
    pub damping: Option<f64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            frame_step: 1,
            momentum: MomentumMode::Off,
            damping: None,
        }
    }
}

/// Value and momentum of a driver for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriverSample {
    pub value: f64,
    pub momentum: f64,
}

pub struct Driver {
    name: String,
    value_fn: ValueFn,
    frame_step: u64,
    mode: MomentumMode,
    damping: f64,
    last_value: f64,
    m1: f64,
    m2: f64,
    momentum: f64,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("frame_step", &self.frame_step)
            .field("mode", &self.mode)
            .field("damping", &self.damping)
            .field("last_value", &self.last_value)
            .field("momentum", &self.momentum)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Create a driver and take its initial reading, so the first sampled delta is
    /// measured from registration rather than from zero.
    pub fn new(
        name: impl Into<String>,
        mut value_fn: ValueFn,
        options: &DriverOptions,
        default_damping: f64,
        ctx: &SampleContext,
    ) -> Self {
        let last_value = value_fn(ctx);
        Self {
            name: name.into(),
            value_fn,
            frame_step: options.frame_step.max(1),
            mode: options.momentum,
            damping: options.damping.unwrap_or(default_damping),
            last_value,
            m1: 0.0,
            m2: 0.0,
            momentum: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last(&self) -> DriverSample {
        DriverSample {
            value: self.last_value,
            momentum: self.momentum,
        }
    }

    /// Sample for `ctx.tick`. Ticks that are not a multiple of the frame step
    /// return the previous sample untouched.
    pub fn sample(&mut self, ctx: &SampleContext) -> DriverSample {
        if ctx.tick % self.frame_step != 0 {
            return self.last();
        }
        let value = (self.value_fn)(ctx);
        if self.mode != MomentumMode::Off {
            let delta = value - self.last_value;
            let d = self.damping;
            self.m1 = self.m1 * d + delta * (1.0 - d);
            self.m2 = self.m2 * d + self.m1 * (1.0 - d);
            let mut momentum = round_half_up(self.m2 * 5000.0) / 10000.0;
            if self.mode == MomentumMode::Absolute {
                momentum = momentum.abs();
            }
            self.momentum = momentum;
        }
        self.last_value = value;
        self.last()
    }
}

#[inline]
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx(tick: u64) -> SampleContext {
        SampleContext {
            tick,
            viewport: Viewport::new(800.0, 600.0),
        }
    }

    fn scripted(values: Vec<f64>) -> ValueFn {
        let mut iter = values.into_iter();
        let mut last = 0.0;
        Box::new(move |_: &SampleContext| {
            if let Some(v) = iter.next() {
                last = v;
            }
            last
        })
    }

    fn momentum_opts(mode: MomentumMode) -> DriverOptions {
        DriverOptions {
            momentum: mode,
            ..DriverOptions::default()
        }
    }

    #[test]
    fn reads_initial_value_at_registration() {
        let d = Driver::new(
            "scroll",
            Box::new(|_: &SampleContext| 42.0),
            &DriverOptions::default(),
            0.8,
            &ctx(0),
        );
        assert_eq!(d.last().value, 42.0);
        assert_eq!(d.name(), "scroll");
    }

    #[test]
    fn frame_driver_follows_tick() {
        let mut d = Driver::new(
            "frame",
            Box::new(|c: &SampleContext| c.tick as f64),
            &DriverOptions::default(),
            0.8,
            &ctx(0),
        );
        for t in 0..5 {
            assert_eq!(d.sample(&ctx(t)).value, t as f64);
        }
    }

    #[test]
    fn decimated_ticks_hold_value_and_momentum() {
        let calls = Rc::new(RefCell::new(0u32));
        let counter = calls.clone();
        let opts = DriverOptions {
            frame_step: 3,
            momentum: MomentumMode::Relative,
            damping: None,
        };
        let mut d = Driver::new(
            "x",
            Box::new(move |c: &SampleContext| {
                *counter.borrow_mut() += 1;
                c.tick as f64 * 10.0
            }),
            &opts,
            0.8,
            &ctx(0),
        );
        let s3 = d.sample(&ctx(3));
        assert_eq!(s3.value, 30.0);
        assert_eq!(d.sample(&ctx(4)), s3);
        assert_eq!(d.sample(&ctx(5)), s3);
        assert_eq!(d.sample(&ctx(6)).value, 60.0);
        // registration + ticks 3 and 6
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn momentum_matches_two_stage_ema() {
        let mut d = Driver::new(
            "x",
            scripted(vec![0.0, 100.0]),
            &momentum_opts(MomentumMode::Relative),
            0.8,
            &ctx(0),
        );
        let s = d.sample(&ctx(0));
        // m1 = 20, m2 = 4 -> round(20000) / 10000
        assert_eq!(s.momentum, 2.0);
        let s = d.sample(&ctx(1));
        // delta 0: m1 = 16, m2 = 3.2 + 3.2 = 6.4
        assert!((s.momentum - 3.2).abs() < 1e-12);
    }

    #[test]
    fn constant_signal_decays_to_zero() {
        let mut d = Driver::new(
            "x",
            scripted(vec![0.0, 50.0]),
            &momentum_opts(MomentumMode::Relative),
            0.8,
            &ctx(0),
        );
        let mut peak: f64 = 0.0;
        let mut last = 0.0;
        for t in 0..400 {
            last = d.sample(&ctx(t)).momentum;
            peak = peak.max(last);
        }
        assert!(peak > 0.0);
        assert_eq!(last, 0.0);
    }

    #[test]
    fn absolute_mode_is_never_negative() {
        let values: Vec<f64> = (0..200)
            .map(|i| ((i as f64) * 0.37).sin() * 500.0 - i as f64 * 3.0)
            .collect();
        let mut d = Driver::new(
            "x",
            scripted(values),
            &momentum_opts(MomentumMode::Absolute),
            0.8,
            &ctx(0),
        );
        let mut saw_nonzero = false;
        for t in 0..200 {
            let m = d.sample(&ctx(t)).momentum;
            assert!(m >= 0.0, "momentum {m} at tick {t}");
            saw_nonzero |= m > 0.0;
        }
        assert!(saw_nonzero);
    }

    #[test]
    fn momentum_off_stays_zero() {
        let mut d = Driver::new(
            "x",
            scripted(vec![0.0, 100.0, 300.0]),
            &DriverOptions::default(),
            0.8,
            &ctx(0),
        );
        for t in 0..3 {
            assert_eq!(d.sample(&ctx(t)).momentum, 0.0);
        }
    }

    #[test]
    fn options_deserialize_camel_case() {
        let opts: DriverOptions =
            serde_json::from_str(r#"{ "frameStep": 2, "momentum": "absolute" }"#).unwrap();
        assert_eq!(opts.frame_step, 2);
        assert_eq!(opts.momentum, MomentumMode::Absolute);
        assert_eq!(opts.damping, None);
    }
}
