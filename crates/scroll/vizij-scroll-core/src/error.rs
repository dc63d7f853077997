//! Error types for the scroll animation core.
//!
//! Resolution and lifecycle errors are returned to the caller. Per-tick
//! problems (unknown driver, unknown preset) are reported as [`BindingError`]
//! values and logged; they never stop a tick.

use thiserror::Error;

use crate::ids::ElementId;

/// Failures while tokenizing, parsing or evaluating a breakpoint expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("unexpected token '{found}' at offset {pos}")]
    UnexpectedToken { pos: usize, found: String },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
    #[error("expression has more than {0} operators")]
    TooLong(usize),
    #[error("expression evaluated to a non-finite value")]
    NonFinite,
}

/// A breakpoint could not be turned into a concrete number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("failed to resolve breakpoint '{expr}': {source}")]
    Expr {
        expr: String,
        #[source]
        source: ExprError,
    },
    #[error("literal breakpoint {0} is not finite")]
    NonFiniteLiteral(f64),
}

/// Authoring and per-tick binding problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("style binding needs at least one breakpoint")]
    Empty,
    #[error("style binding has {inputs} input and {outputs} output breakpoints")]
    LengthMismatch { inputs: usize, outputs: usize },
    #[error("no driver named '{driver}' (property '{property}')")]
    UnknownDriver { driver: String, property: String },
    #[error("no preset named '{0}'")]
    UnknownPreset(String),
}

/// Engine lifecycle and element resolution failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,
    #[error("engine is not running")]
    NotRunning,
    #[error("engine has been shut down")]
    Stopped,
    #[error("element {element:?}: property '{property}': {source}")]
    Resolve {
        element: ElementId,
        property: String,
        #[source]
        source: ResolveError,
    },
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),
}
