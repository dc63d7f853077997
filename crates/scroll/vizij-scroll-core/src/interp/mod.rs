//! Piecewise-linear lookup over ordered breakpoints.
//!
//! `k` counts the input breakpoints strictly below the sampled value:
//! - `k == 0` clamps to the first output,
//! - `k == len` clamps to the last output,
//! - otherwise segment `[k - 1, k]` is blended with optional easing.
//!
//! Degenerate segments (equal adjacent inputs) behave as a step and return the
//! left output. Progress is clamped to [0, 1] before easing so authored inputs
//! in non-monotonic order never extrapolate.

pub mod functions;

use crate::easing::Easing;
use functions::{invlerp, lerp};

/// Map `value` through `inputs -> outputs`. Both slices must have the same
/// non-zero length; an empty mapping yields `0.0`.
pub fn interpolate(inputs: &[f64], outputs: &[f64], value: f64, easing: Option<Easing>) -> f64 {
    let n = inputs.len().min(outputs.len());
    if n == 0 {
        return 0.0;
    }
    let k = inputs[..n].iter().filter(|a| **a < value).count();
    if k == 0 {
        return outputs[0];
    }
    if k >= n {
        return outputs[n - 1];
    }
    let j = k - 1;
    let Some(t) = invlerp(inputs[j], inputs[k], value) else {
        return outputs[j];
    };
    let t = t.clamp(0.0, 1.0);
    // boundaries stay exact regardless of curve rounding
    let t = match easing {
        Some(e) if t > 0.0 && t < 1.0 => e.apply(t),
        _ => t,
    };
    lerp(outputs[j], outputs[k], t)
}
