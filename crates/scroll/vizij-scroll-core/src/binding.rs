//! Element bindings: one rendered element, its authored animations, and the
//! breakpoints resolved against its current geometry.
//!
//! Presets are expanded once when the binding is created. Breakpoints are
//! resolved on creation and again on every geometry invalidation; a failed
//! resolution leaves the previously resolved state in place.

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::data::{AnimationEntry, AnimationsData, BindingOptions, StyleBinding};
use crate::driver::DriverSample;
use crate::error::{BindingError, EngineError};
use crate::geometry::Geometry;
use crate::ids::{ElementHandle, ElementId};
use crate::interp::interpolate;
use crate::presets::PresetRegistry;
use crate::resolve::resolve_all;
use crate::style::{flatten_entries, StyleAssignment, StyleValue};
use crate::surface::ElementTarget;

/// A style binding with concrete breakpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBinding {
    pub property: String,
    pub inputs: Vec<f64>,
    pub outputs: Vec<f64>,
    pub options: BindingOptions,
}

impl ResolvedBinding {
    /// Loop wrap -> interpolate with easing -> add weighted momentum -> format.
    pub fn compute(&self, sample: DriverSample) -> StyleValue {
        let v = self.options.wrap(sample.value);
        let mut out = interpolate(&self.inputs, &self.outputs, v, self.options.easing);
        if let Some(weight) = self.options.momentum {
            out += weight * sample.momentum;
        }
        match &self.options.css_fn {
            Some(f) => StyleValue::Text(f.format(out)),
            None => StyleValue::Number(out),
        }
    }
}

/// Resolved bindings of one driver, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverBindings {
    pub driver: String,
    pub bindings: Vec<ResolvedBinding>,
}

/// Result of updating one element for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementUpdate {
    /// Empty when nothing was recomputed this tick.
    pub assignments: Vec<StyleAssignment>,
    pub errors: Vec<BindingError>,
}

#[derive(Debug)]
pub struct ElementBinding {
    id: ElementId,
    handle: ElementHandle,
    target: ElementTarget,
    index: usize,
    expanded: Vec<(String, IndexMap<String, StyleBinding>)>,
    resolved: Vec<DriverBindings>,
    /// Last computed value per property; key order is declaration order.
    styles: IndexMap<String, Option<StyleValue>>,
}

impl ElementBinding {
    /// Expand presets and resolve breakpoints against `geometry`.
    pub fn new(
        id: ElementId,
        handle: ElementHandle,
        target: ElementTarget,
        index: usize,
        data: &AnimationsData,
        presets: &PresetRegistry,
        geometry: &Geometry,
    ) -> Result<Self, EngineError> {
        let mut binding = Self {
            id,
            handle,
            target,
            index,
            expanded: expand(data, presets),
            resolved: Vec::new(),
            styles: IndexMap::new(),
        };
        binding.recalculate(geometry)?;
        Ok(binding)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    pub fn target(&self) -> &ElementTarget {
        &self.target
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn resolved(&self) -> &[DriverBindings] {
        &self.resolved
    }

    /// Authored bindings after preset expansion, per driver.
    pub fn expanded(&self) -> &[(String, IndexMap<String, StyleBinding>)] {
        &self.expanded
    }

    /// Last computed value for `property`.
    pub fn value(&self, property: &str) -> Option<&StyleValue> {
        self.styles.get(property).and_then(Option::as_ref)
    }

    /// Re-resolve every breakpoint. Replaces the resolved state wholesale on
    /// success and leaves it untouched on failure.
    pub fn recalculate(&mut self, geometry: &Geometry) -> Result<(), EngineError> {
        let mut resolved = Vec::with_capacity(self.expanded.len());
        for (driver, bindings) in &self.expanded {
            let mut out = Vec::with_capacity(bindings.len());
            for (property, binding) in bindings {
                let fail = |source| EngineError::Resolve {
                    element: self.id,
                    property: property.clone(),
                    source,
                };
                let inputs = resolve_all(binding.inputs(), geometry, self.index).map_err(fail)?;
                let outputs = resolve_all(binding.outputs(), geometry, self.index).map_err(fail)?;
                out.push(ResolvedBinding {
                    property: property.clone(),
                    inputs,
                    outputs,
                    options: binding.options().clone(),
                });
            }
            resolved.push(DriverBindings {
                driver: driver.clone(),
                bindings: out,
            });
        }
        self.resolved = resolved;
        self.sync_style_slots();
        Ok(())
    }

    /// Rebuild the style cache keys in declaration order, keeping known values.
    fn sync_style_slots(&mut self) {
        let mut styles = IndexMap::new();
        for block in &self.resolved {
            for b in &block.bindings {
                let prev = self.styles.get(&b.property).cloned().flatten();
                styles.entry(b.property.clone()).or_insert(prev);
            }
        }
        self.styles = styles;
    }

    /// Compute every property due on `tick` and compose the element's style.
    pub fn update(&mut self, drivers: &HashMap<String, DriverSample>, tick: u64) -> ElementUpdate {
        let mut errors = Vec::new();
        let mut changed = false;
        for block in &self.resolved {
            let Some(sample) = drivers.get(&block.driver) else {
                errors.extend(block.bindings.iter().map(|b| BindingError::UnknownDriver {
                    driver: block.driver.clone(),
                    property: b.property.clone(),
                }));
                continue;
            };
            for b in &block.bindings {
                if tick % b.options.step() != 0 {
                    continue;
                }
                let value = b.compute(*sample);
                if let Some(slot) = self.styles.get_mut(&b.property) {
                    *slot = Some(value);
                    changed = true;
                }
            }
        }
        let assignments = if changed {
            flatten_entries(
                self.styles
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v))),
            )
        } else {
            Vec::new()
        };
        ElementUpdate {
            assignments,
            errors,
        }
    }
}

/// Merge presets and explicit bindings per driver in authored order; later
/// writes to a property replace earlier ones.
fn expand(
    data: &AnimationsData,
    presets: &PresetRegistry,
) -> Vec<(String, IndexMap<String, StyleBinding>)> {
    data.iter()
        .map(|(driver, block)| {
            let mut merged: IndexMap<String, StyleBinding> = IndexMap::new();
            for entry in block.entries() {
                match entry {
                    AnimationEntry::Preset(p) => match presets.expand(&p.name, &p.args) {
                        Some(expansion) => merged.extend(expansion),
                        None => log::error!("{}", BindingError::UnknownPreset(p.name.clone())),
                    },
                    AnimationEntry::Binding(property, binding) => {
                        merged.insert(property.clone(), binding.clone());
                    }
                }
            }
            (driver.clone(), merged)
        })
        .collect()
}
