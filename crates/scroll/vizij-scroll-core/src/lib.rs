//! Vizij Scroll Core (host-agnostic)
//!
//! Samples named scalar signals ("drivers") once per frame, maps them through
//! piecewise breakpoint tables resolved against element geometry, and writes the
//! resulting style values to a rendering surface. The surface and the frame
//! scheduler are supplied by the host through [`RenderSurface`] and
//! [`FrameScheduler`].

pub mod binding;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod driver;
pub mod easing;
pub mod engine;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod ids;
pub mod interp;
pub mod presets;
pub mod resolve;
pub mod style;
pub mod surface;

// Re-exports for consumers (adapters)
pub use binding::{DriverBindings, ElementBinding, ElementUpdate, ResolvedBinding};
pub use config::{Config, DEFAULT_FRAME_DRIVER};
pub use data::{
    AnimationEntry, AnimationsData, BindingOptions, CssFormatter, DriverAnimations,
    ElementOptions, PresetArgs, PresetRef, StyleBinding,
};
pub use driver::{Driver, DriverOptions, DriverSample, MomentumMode, SampleContext, ValueFn};
pub use easing::Easing;
pub use engine::{Engine, EngineState, TickReport};
pub use error::{BindingError, EngineError, ExprError, ResolveError};
pub use expr::{Expr, Quantity};
pub use geometry::{Geometry, Rect, Viewport};
pub use ids::{ElementHandle, ElementId, FrameRequest};
pub use interp::interpolate;
pub use presets::{PresetFn, PresetRegistry};
pub use resolve::{resolve, Breakpoint};
pub use style::{flatten, StyleAssignment, StyleValue};
pub use surface::{ElementTarget, FrameScheduler, ManualScheduler, RenderSurface};
