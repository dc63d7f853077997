//! Named presets that expand into style bindings.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::data::{BindingOptions, PresetArgs, StyleBinding};
use crate::resolve::Breakpoint;

/// Expands preset arguments into property bindings.
pub type PresetFn = Arc<dyn Fn(&PresetArgs) -> IndexMap<String, StyleBinding> + Send + Sync>;

#[derive(Clone, Default)]
pub struct PresetRegistry {
    presets: HashMap<String, PresetFn>,
}

impl fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.presets.keys().collect();
        names.sort();
        f.debug_struct("PresetRegistry")
            .field("presets", &names)
            .finish()
    }
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in presets.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register("fadeIn", |a| {
            one("opacity", ["elInBottom", "elCenterVert"], [a.value.unwrap_or(0.0), 1.0])
        });
        reg.register("fadeOut", |a| {
            one("opacity", ["elCenterVert", "elOutTop"], [1.0, a.value.unwrap_or(0.0)])
        });
        reg.register("fadeInOut", |a| {
            let v = a.value.unwrap_or(0.0);
            one(
                "opacity",
                ["elInBottom", "elCenterVert", "elOutTop"],
                [v, 1.0, v],
            )
        });
        reg.register("scaleIn", |a| {
            one("scale", ["elInBottom", "elCenterVert"], [a.value.unwrap_or(0.6), 1.0])
        });
        reg.register("scaleOut", |a| {
            one("scale", ["elCenterVert", "elOutTop"], [1.0, a.value.unwrap_or(0.6)])
        });
        reg.register("blurIn", |a| {
            one("blur", ["elInBottom", "elCenterVert"], [a.value.unwrap_or(20.0), 0.0])
        });
        reg.register("blurOut", |a| {
            one("blur", ["elCenterVert", "elOutTop"], [0.0, a.value.unwrap_or(20.0)])
        });
        reg.register("slideX", |a| {
            one(
                "translateX",
                ["elInBottom", "elOutTop"],
                [0.0, a.value.unwrap_or(500.0)],
            )
        });
        reg.register("slideY", |a| {
            one(
                "translateY",
                ["elInBottom", "elOutTop"],
                [0.0, a.value.unwrap_or(500.0)],
            )
        });
        reg.register("spin", |a| {
            let property = match a.axis.as_deref() {
                Some("x" | "X") => "rotateX",
                Some("y" | "Y") => "rotateY",
                _ => "rotate",
            };
            looping(property, a.value.unwrap_or(360.0), a.speed.unwrap_or(1000.0))
        });
        reg.register("hueRotate", |a| {
            looping("hue-rotate", a.value.unwrap_or(360.0), a.speed.unwrap_or(1000.0))
        });
        reg
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&PresetArgs) -> IndexMap<String, StyleBinding> + Send + Sync + 'static,
    ) {
        self.presets.insert(name.into(), Arc::new(f));
    }

    /// Layer `other` over `self`; entries in `other` win.
    pub fn extend(&mut self, other: PresetRegistry) {
        self.presets.extend(other.presets);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Expand `name`, or `None` when no such preset exists.
    pub fn expand(&self, name: &str, args: &PresetArgs) -> Option<IndexMap<String, StyleBinding>> {
        self.presets.get(name).map(|f| f(args))
    }
}

fn breakpoints<const N: usize>(exprs: [&str; N]) -> Vec<Breakpoint> {
    exprs.iter().map(|e| Breakpoint::from(*e)).collect()
}

fn one<const N: usize>(
    property: &str,
    inputs: [&str; N],
    outputs: [f64; N],
) -> IndexMap<String, StyleBinding> {
    let outputs = outputs.iter().map(|v| Breakpoint::Literal(*v)).collect();
    single(property, breakpoints(inputs), outputs, BindingOptions::default())
}

/// `0..period` maps to `0..amount` and repeats every `period` units of the driver.
fn looping(property: &str, amount: f64, period: f64) -> IndexMap<String, StyleBinding> {
    single(
        property,
        vec![Breakpoint::Literal(0.0), Breakpoint::Literal(period)],
        vec![Breakpoint::Literal(0.0), Breakpoint::Literal(amount)],
        BindingOptions::default().with_loop_frame(period),
    )
}

fn single(
    property: &str,
    inputs: Vec<Breakpoint>,
    outputs: Vec<Breakpoint>,
    options: BindingOptions,
) -> IndexMap<String, StyleBinding> {
    let mut out = IndexMap::new();
    // equal lengths hold for every call site above
    if let Ok(binding) = StyleBinding::new(inputs, outputs, options) {
        out.insert(property.to_string(), binding);
    }
    out
}
