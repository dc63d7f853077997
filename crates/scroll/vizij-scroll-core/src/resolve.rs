//! Breakpoint resolution against element and viewport geometry.

use serde::{Deserialize, Serialize};

use crate::error::{ExprError, ResolveError};
use crate::expr::{Expr, Quantity};
use crate::geometry::Geometry;

/// One authored breakpoint: a literal number or a geometry expression such as
/// `"elCenterVert - screenHeight/4"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Breakpoint {
    Literal(f64),
    Expr(String),
}

impl From<f64> for Breakpoint {
    fn from(v: f64) -> Self {
        Breakpoint::Literal(v)
    }
}

impl From<i32> for Breakpoint {
    fn from(v: i32) -> Self {
        Breakpoint::Literal(v as f64)
    }
}

impl From<&str> for Breakpoint {
    fn from(v: &str) -> Self {
        Breakpoint::Expr(v.to_string())
    }
}

impl From<String> for Breakpoint {
    fn from(v: String) -> Self {
        Breakpoint::Expr(v)
    }
}

/// Value of `q` for an element measured in `geometry` at selection position `index`.
pub fn quantity_value(q: Quantity, geometry: &Geometry, index: usize) -> f64 {
    let vp = &geometry.viewport;
    match q {
        Quantity::ScreenWidth => vp.width,
        Quantity::ScreenHeight => vp.height,
        Quantity::ElWidth => geometry.width,
        Quantity::ElHeight => geometry.height,
        Quantity::ElInBottom => geometry.top - vp.height,
        Quantity::ElOutTop => geometry.bottom(),
        Quantity::ElCenterVert => geometry.top + geometry.height / 2.0 - vp.height / 2.0,
        Quantity::ElInRight => geometry.left - vp.width,
        Quantity::ElOutLeft => geometry.right(),
        Quantity::ElCenterHoriz => geometry.left + geometry.width / 2.0 - vp.width / 2.0,
        Quantity::Index => index as f64,
    }
}

/// Resolve `breakpoint` into a concrete number. Literals pass through unchanged.
pub fn resolve(
    breakpoint: &Breakpoint,
    geometry: &Geometry,
    index: usize,
) -> Result<f64, ResolveError> {
    match breakpoint {
        Breakpoint::Literal(v) if v.is_finite() => Ok(*v),
        Breakpoint::Literal(v) => Err(ResolveError::NonFiniteLiteral(*v)),
        Breakpoint::Expr(src) => {
            let wrap = |source| ResolveError::Expr {
                expr: src.clone(),
                source,
            };
            let expr = Expr::parse(src).map_err(wrap)?;
            let value = expr.eval(&|q| quantity_value(q, geometry, index));
            if value.is_finite() {
                Ok(value)
            } else {
                Err(wrap(ExprError::NonFinite))
            }
        }
    }
}

/// Resolve a whole breakpoint sequence, preserving authored order.
pub fn resolve_all(
    breakpoints: &[Breakpoint],
    geometry: &Geometry,
    index: usize,
) -> Result<Vec<f64>, ResolveError> {
    breakpoints.iter().map(|s| resolve(s, geometry, index)).collect()
}
