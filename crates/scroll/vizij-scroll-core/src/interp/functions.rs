//! Scalar interpolation helpers:
//! - lerp (blend between two outputs)
//! - invlerp (normalized position of a value between two inputs)

/// Linear interpolation of scalars in the `start * (1 - t) + end * t` form,
/// which returns `end` exactly at `t == 1`.
#[inline]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Normalized progress of `v` from `a` to `b`.
/// Returns `None` when the span is degenerate (`a == b`) or the result is not finite.
#[inline]
pub fn invlerp(a: f64, b: f64, v: f64) -> Option<f64> {
    let span = b - a;
    if span == 0.0 {
        return None;
    }
    let t = (v - a) / span;
    t.is_finite().then_some(t)
}
