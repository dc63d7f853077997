//! Easing functions mapping normalized progress in [0, 1] to eased progress.
//!
//! Names follow the conventional `easeInQuad` / `easeOutBounce` vocabulary so
//! declarative animation data can select them by string. Back easings overshoot
//! the [0, 1] range by design of their curves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;
const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

/// Named easing curve. Absence of an easing means linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInBounce,
    EaseOutBounce,
    EaseInBack,
    EaseOutBack,
}

impl Easing {
    pub const ALL: [Easing; 17] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInBack,
        Easing::EaseOutBack,
    ];

    /// Evaluate the curve at progress `t`.
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => {
                let u = t - 1.0;
                1.0 - u * u * u * u
            }
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    let u = t - 1.0;
                    1.0 - 8.0 * u * u * u * u
                }
            }
            Easing::EaseInQuint => t * t * t * t * t,
            Easing::EaseOutQuint => {
                let u = t - 1.0;
                1.0 + u * u * u * u * u
            }
            Easing::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t * t * t * t * t
                } else {
                    let u = t - 1.0;
                    1.0 + 16.0 * u * u * u * u * u
                }
            }
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::EaseOutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
        }
    }

    /// Declarative name of the curve (`"easeOutBounce"`).
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuart => "easeInQuart",
            Easing::EaseOutQuart => "easeOutQuart",
            Easing::EaseInOutQuart => "easeInOutQuart",
            Easing::EaseInQuint => "easeInQuint",
            Easing::EaseOutQuint => "easeOutQuint",
            Easing::EaseInOutQuint => "easeInOutQuint",
            Easing::EaseInBounce => "easeInBounce",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
        }
    }
}

/// Four-segment bounce curve.
#[inline]
fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let u = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * u * u + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let u = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * u * u + 0.9375
    } else {
        let u = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * u * u + 0.984375
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| format!("unknown easing '{s}'"))
    }
}
