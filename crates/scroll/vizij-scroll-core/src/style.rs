//! Composition of per-property values into element style assignments.
//!
//! Transform and filter primitives are folded into one `transform` and one
//! `filter` string in declaration order; everything else is assigned directly.
//! Numeric values get an implicit unit (`px` or `deg`) based on the property.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const TRANSFORMS: &[&str] = &[
    "perspective",
    "translateX",
    "translateY",
    "translate",
    "scaleX",
    "scaleY",
    "scale",
    "skewX",
    "skewY",
    "skew",
    "rotateX",
    "rotateY",
    "rotate",
];

const FILTERS: &[&str] = &["blur", "hue-rotate", "brightness"];

const PX_UNITS: &[&str] = &[
    "perspective",
    "translateX",
    "translateY",
    "translate",
    "border-radius",
    "blur",
];

const DEG_UNITS: &[&str] = &[
    "hue-rotate",
    "rotate",
    "rotateX",
    "rotateY",
    "skew",
    "skewX",
    "skewY",
];

/// Computed value of one property: a number, or formatter output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(_) => None,
        }
    }

    /// Render for `property`, appending the implicit unit to numbers.
    pub fn render(&self, property: &str) -> String {
        match self {
            StyleValue::Number(n) => format!("{n}{}", unit_for(property)),
            StyleValue::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{n}"),
            StyleValue::Text(t) => f.write_str(t),
        }
    }
}

/// How a property is written to the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Transform,
    Filter,
    Plain,
}

pub fn property_kind(property: &str) -> PropertyKind {
    if TRANSFORMS.contains(&property) {
        PropertyKind::Transform
    } else if FILTERS.contains(&property) {
        PropertyKind::Filter
    } else {
        PropertyKind::Plain
    }
}

pub fn unit_for(property: &str) -> &'static str {
    if PX_UNITS.contains(&property) {
        "px"
    } else if DEG_UNITS.contains(&property) {
        "deg"
    } else {
        ""
    }
}

/// A single write to an element's style map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleAssignment {
    pub property: String,
    pub value: String,
}

impl StyleAssignment {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Flatten `styles` into assignments: `transform`, then `filter`, then plain
/// properties in declaration order. Composite entries are only emitted when a
/// member property is present.
pub fn flatten(styles: &IndexMap<String, StyleValue>) -> Vec<StyleAssignment> {
    flatten_entries(styles.iter().map(|(k, v)| (k.as_str(), v)))
}

/// [`flatten`] over any ordered sequence of `(property, value)` pairs.
pub fn flatten_entries<'a>(
    styles: impl IntoIterator<Item = (&'a str, &'a StyleValue)>,
) -> Vec<StyleAssignment> {
    let mut transform: Vec<String> = Vec::new();
    let mut filter: Vec<String> = Vec::new();
    let mut plain: Vec<StyleAssignment> = Vec::new();

    for (property, value) in styles {
        let rendered = value.render(property);
        match property_kind(property) {
            PropertyKind::Transform => transform.push(format!("{property}({rendered})")),
            PropertyKind::Filter => filter.push(format!("{property}({rendered})")),
            PropertyKind::Plain => plain.push(StyleAssignment::new(property, rendered)),
        }
    }

    let mut out = Vec::with_capacity(plain.len() + 2);
    if !transform.is_empty() {
        out.push(StyleAssignment::new("transform", transform.join(" ")));
    }
    if !filter.is_empty() {
        out.push(StyleAssignment::new("filter", filter.join(" ")));
    }
    out.extend(plain);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(entries: &[(&str, StyleValue)]) -> IndexMap<String, StyleValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn composites_keep_declaration_order() {
        let s = styles(&[
            ("opacity", StyleValue::Number(0.5)),
            ("rotate", StyleValue::Number(45.0)),
            ("blur", StyleValue::Number(2.0)),
            ("translateX", StyleValue::Number(10.0)),
            ("hue-rotate", StyleValue::Number(90.0)),
            ("border-radius", StyleValue::Number(4.0)),
        ]);
        assert_eq!(
            flatten(&s),
            vec![
                StyleAssignment::new("transform", "rotate(45deg) translateX(10px)"),
                StyleAssignment::new("filter", "blur(2px) hue-rotate(90deg)"),
                StyleAssignment::new("opacity", "0.5"),
                StyleAssignment::new("border-radius", "4px"),
            ]
        );
    }

    #[test]
    fn unitless_and_text_values() {
        let s = styles(&[
            ("scale", StyleValue::Number(1.5)),
            ("brightness", StyleValue::Number(0.8)),
            ("background-color", StyleValue::Text("rgb(10, 0, 0)".into())),
        ]);
        assert_eq!(
            flatten(&s),
            vec![
                StyleAssignment::new("transform", "scale(1.5)"),
                StyleAssignment::new("filter", "brightness(0.8)"),
                StyleAssignment::new("background-color", "rgb(10, 0, 0)"),
            ]
        );
    }

    #[test]
    fn no_composites_without_members() {
        let s = styles(&[("opacity", StyleValue::Number(1.0))]);
        assert_eq!(flatten(&s), vec![StyleAssignment::new("opacity", "1")]);
        assert!(flatten(&IndexMap::new()).is_empty());
    }

    #[test]
    fn kinds_and_units() {
        assert_eq!(property_kind("skewY"), PropertyKind::Transform);
        assert_eq!(property_kind("hue-rotate"), PropertyKind::Filter);
        assert_eq!(property_kind("opacity"), PropertyKind::Plain);
        assert_eq!(unit_for("perspective"), "px");
        assert_eq!(unit_for("skew"), "deg");
        assert_eq!(unit_for("scale"), "");
    }
}
