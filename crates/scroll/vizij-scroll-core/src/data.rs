//! Authored animation data model.
//!
//! JSON shape (per element):
//! ```json
//! {
//!   "scrollY": {
//!     "presets": ["fadeIn", "spin 360,1200"],
//!     "translateY": [["elInBottom", "elOutTop"], [0, -200], { "easing": "easeOutQuad" }]
//!   }
//! }
//! ```
//! Entries inside a driver block keep document order; presets and explicit
//! bindings are merged in that order with the last write winning.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::easing::Easing;
use crate::error::BindingError;
use crate::resolve::Breakpoint;

/// Formats the final numeric value of a property into its style string.
#[derive(Clone)]
pub enum CssFormatter {
    /// Every `{}` is replaced by the value.
    Template(String),
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl CssFormatter {
    pub fn custom(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        CssFormatter::Custom(Arc::new(f))
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            CssFormatter::Template(t) => t.replace("{}", &value.to_string()),
            CssFormatter::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for CssFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssFormatter::Template(t) => f.debug_tuple("Template").field(t).finish(),
            CssFormatter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for CssFormatter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CssFormatter::Template(a), CssFormatter::Template(b)) => a == b,
            (CssFormatter::Custom(a), CssFormatter::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for CssFormatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CssFormatter::Template(t) => serializer.serialize_str(t),
            CssFormatter::Custom(_) => Err(serde::ser::Error::custom(
                "custom css formatters cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for CssFormatter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(CssFormatter::Template)
    }
}

/// Per-binding options. Every field is optional; absence has no effect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindingOptions {
    /// Wrap the driver value modulo this period before lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_frame: Option<f64>,
    /// Recompute only on ticks that are a multiple of this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_step: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    /// Weight applied to the driver momentum and added after interpolation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_fn: Option<CssFormatter>,
}

impl BindingOptions {
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_loop_frame(mut self, period: f64) -> Self {
        self.loop_frame = Some(period);
        self
    }

    pub fn with_frame_step(mut self, step: u64) -> Self {
        self.frame_step = Some(step);
        self
    }

    pub fn with_momentum(mut self, weight: f64) -> Self {
        self.momentum = Some(weight);
        self
    }

    pub fn with_css_fn(mut self, formatter: CssFormatter) -> Self {
        self.css_fn = Some(formatter);
        self
    }

    /// Effective frame step (unset or zero is 1).
    pub fn step(&self) -> u64 {
        self.frame_step.unwrap_or(1).max(1)
    }

    /// Apply the loop period if it is set and positive.
    pub fn wrap(&self, value: f64) -> f64 {
        match self.loop_frame {
            Some(period) if period > 0.0 => value % period,
            _ => value,
        }
    }
}

/// Mapping of a driver range onto one style property.
/// Invariant: `inputs.len() == outputs.len() >= 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StyleBindingRepr")]
pub struct StyleBinding {
    inputs: Vec<Breakpoint>,
    outputs: Vec<Breakpoint>,
    #[serde(default, skip_serializing_if = "is_default_options")]
    options: BindingOptions,
}

fn is_default_options(o: &BindingOptions) -> bool {
    *o == BindingOptions::default()
}

impl StyleBinding {
    pub fn new(
        inputs: Vec<Breakpoint>,
        outputs: Vec<Breakpoint>,
        options: BindingOptions,
    ) -> Result<Self, BindingError> {
        if inputs.is_empty() {
            return Err(BindingError::Empty);
        }
        if inputs.len() != outputs.len() {
            return Err(BindingError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        Ok(Self {
            inputs,
            outputs,
            options,
        })
    }

    pub fn inputs(&self) -> &[Breakpoint] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Breakpoint] {
        &self.outputs
    }

    pub fn options(&self) -> &BindingOptions {
        &self.options
    }
}

/// Accepted JSON forms: `[inputs, outputs]`, `[inputs, outputs, options]`, or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StyleBindingRepr {
    Pair(Vec<Breakpoint>, Vec<Breakpoint>),
    Triple(Vec<Breakpoint>, Vec<Breakpoint>, BindingOptions),
    Object {
        inputs: Vec<Breakpoint>,
        outputs: Vec<Breakpoint>,
        #[serde(default)]
        options: BindingOptions,
    },
}

impl TryFrom<StyleBindingRepr> for StyleBinding {
    type Error = BindingError;

    fn try_from(repr: StyleBindingRepr) -> Result<Self, Self::Error> {
        match repr {
            StyleBindingRepr::Pair(i, o) => StyleBinding::new(i, o, BindingOptions::default()),
            StyleBindingRepr::Triple(i, o, opts) => StyleBinding::new(i, o, opts),
            StyleBindingRepr::Object {
                inputs,
                outputs,
                options,
            } => StyleBinding::new(inputs, outputs, options),
        }
    }
}

/// Reference to a named preset: `"name"` or `"name value,speed,axis"`.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetRef {
    pub name: String,
    pub args: PresetArgs,
}

/// Optional arguments handed to a preset function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetArgs {
    pub value: Option<f64>,
    pub speed: Option<f64>,
    pub axis: Option<String>,
}

impl PresetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: PresetArgs::default(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = s.split_whitespace();
        let name = parts.next().ok_or_else(|| "empty preset reference".to_string())?;
        let opts = parts.next().unwrap_or("");
        if let Some(extra) = parts.next() {
            return Err(format!("unexpected '{extra}' in preset reference '{s}'"));
        }
        let mut fields = opts.split(',');
        let value = parse_opt_f64(fields.next())?;
        let speed = parse_opt_f64(fields.next())?;
        let axis = fields
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Ok(Self {
            name: name.to_string(),
            args: PresetArgs { value, speed, axis },
        })
    }
}

fn parse_opt_f64(field: Option<&str>) -> Result<Option<f64>, String> {
    match field.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("invalid preset argument '{text}'")),
    }
}

impl fmt::Display for PresetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        let a = &self.args;
        if a.value.is_none() && a.speed.is_none() && a.axis.is_none() {
            return Ok(());
        }
        let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(f, " {},{}", num(a.value), num(a.speed))?;
        if let Some(axis) = &a.axis {
            write!(f, ",{axis}")?;
        }
        Ok(())
    }
}

/// One entry of a driver block, in authored order.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationEntry {
    Preset(PresetRef),
    Binding(String, StyleBinding),
}

/// All bindings an element declares against one driver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverAnimations {
    entries: Vec<AnimationEntry>,
}

impl DriverAnimations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(mut self, preset: PresetRef) -> Self {
        self.entries.push(AnimationEntry::Preset(preset));
        self
    }

    pub fn bind(mut self, property: impl Into<String>, binding: StyleBinding) -> Self {
        self.entries
            .push(AnimationEntry::Binding(property.into(), binding));
        self
    }

    pub fn entries(&self) -> &[AnimationEntry] {
        &self.entries
    }
}

impl Serialize for DriverAnimations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut i = 0;
        while i < self.entries.len() {
            match &self.entries[i] {
                AnimationEntry::Binding(key, binding) => {
                    map.serialize_entry(key, binding)?;
                    i += 1;
                }
                AnimationEntry::Preset(_) => {
                    // consecutive presets share one "presets" key
                    let mut run = Vec::new();
                    while let Some(AnimationEntry::Preset(p)) = self.entries.get(i) {
                        run.push(p.to_string());
                        i += 1;
                    }
                    map.serialize_entry("presets", &run)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DriverAnimations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DriverAnimations;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of style properties to bindings, with optional \"presets\"")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "presets" {
                        let refs: Vec<String> = access.next_value()?;
                        for r in refs {
                            let preset = PresetRef::parse(&r).map_err(de::Error::custom)?;
                            entries.push(AnimationEntry::Preset(preset));
                        }
                    } else {
                        let binding: StyleBinding = access.next_value()?;
                        entries.push(AnimationEntry::Binding(key, binding));
                    }
                }
                Ok(DriverAnimations { entries })
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Driver name -> bindings, in declaration order.
pub type AnimationsData = IndexMap<String, DriverAnimations>;

/// Style written once when an element is bound.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_change: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_forms_parse() {
        let pair: StyleBinding = serde_json::from_str(r#"[[0, 100], [0, 1]]"#).unwrap();
        assert_eq!(pair.inputs().len(), 2);
        assert_eq!(pair.options(), &BindingOptions::default());

        let triple: StyleBinding = serde_json::from_str(
            r#"[["elInBottom", "elOutTop"], [1, 0], { "easing": "easeInQuad", "frameStep": 2 }]"#,
        )
        .unwrap();
        assert_eq!(triple.options().easing, Some(Easing::EaseInQuad));
        assert_eq!(triple.options().step(), 2);

        let obj: StyleBinding = serde_json::from_str(
            r#"{ "inputs": [0], "outputs": [5], "options": { "cssFn": "rgb({}, 0, 0)" } }"#,
        )
        .unwrap();
        assert_eq!(
            obj.options().css_fn.as_ref().map(|f| f.format(12.0)),
            Some("rgb(12, 0, 0)".to_string())
        );
    }

    #[test]
    fn binding_lengths_are_validated() {
        assert!(serde_json::from_str::<StyleBinding>(r#"[[0, 1], [0]]"#).is_err());
        assert!(serde_json::from_str::<StyleBinding>(r#"[[], []]"#).is_err());
        assert_eq!(
            StyleBinding::new(vec![0.into()], vec![], BindingOptions::default()),
            Err(BindingError::LengthMismatch {
                inputs: 1,
                outputs: 0
            })
        );
    }

    #[test]
    fn unknown_easing_is_rejected() {
        assert!(serde_json::from_str::<BindingOptions>(r#"{ "easing": "wobble" }"#).is_err());
    }

    #[test]
    fn wrap_and_step_defaults() {
        let o = BindingOptions::default();
        assert_eq!(o.step(), 1);
        assert_eq!(o.wrap(150.0), 150.0);
        assert_eq!(o.clone().with_loop_frame(100.0).wrap(150.0), 50.0);
        assert_eq!(o.clone().with_loop_frame(0.0).wrap(150.0), 150.0);
        assert_eq!(o.with_frame_step(0).step(), 1);
    }

    #[test]
    fn preset_refs_parse() {
        assert_eq!(PresetRef::parse("fadeIn").unwrap(), PresetRef::new("fadeIn"));
        let p = PresetRef::parse("spin 360,1200,X").unwrap();
        assert_eq!(p.name, "spin");
        assert_eq!(p.args.value, Some(360.0));
        assert_eq!(p.args.speed, Some(1200.0));
        assert_eq!(p.args.axis.as_deref(), Some("X"));
        let p = PresetRef::parse("slideX ,2").unwrap();
        assert_eq!(p.args.value, None);
        assert_eq!(p.args.speed, Some(2.0));
        assert!(PresetRef::parse("").is_err());
        assert!(PresetRef::parse("spin abc").is_err());
        assert_eq!(PresetRef::parse("spin 360,1200,X").unwrap().to_string(), "spin 360,1200,X");
    }

    #[test]
    fn driver_block_keeps_document_order() {
        let block: DriverAnimations = serde_json::from_str(
            r#"{
                "opacity": [[0, 1], [0, 1]],
                "presets": ["fadeIn", "spin 90"],
                "scale": [[0, 1], [1, 2]]
            }"#,
        )
        .unwrap();
        let kinds: Vec<String> = block
            .entries()
            .iter()
            .map(|e| match e {
                AnimationEntry::Preset(p) => format!("preset:{}", p.name),
                AnimationEntry::Binding(k, _) => format!("bind:{k}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["bind:opacity", "preset:fadeIn", "preset:spin", "bind:scale"]
        );

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["presets"], serde_json::json!(["fadeIn", "spin 90,"]));
    }

    #[test]
    fn animations_data_orders_drivers() {
        let data: AnimationsData = serde_json::from_str(
            r#"{ "scrollY": { "opacity": [[0], [1]] }, "frame": { "rotate": [[0, 10], [0, 90]] } }"#,
        )
        .unwrap();
        let names: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["scrollY", "frame"]);
    }
}
