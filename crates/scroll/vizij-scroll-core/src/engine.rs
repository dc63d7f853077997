//! Engine: owns drivers and element bindings and advances the frame counter.
//!
//! Per tick:
//! - poll the viewport and re-resolve every element if its size changed
//! - sample every driver in registration order
//! - update every element in insertion order and write its style to the surface
//! - record telemetry (debug only), then increment the frame counter
//!
//! Drivers and elements may be added or removed between ticks at any time.

use std::time::Instant;

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::binding::ElementBinding;
use crate::config::Config;
use crate::data::{AnimationsData, ElementOptions};
use crate::diagnostics::Telemetry;
use crate::driver::{Driver, DriverOptions, DriverSample, SampleContext, ValueFn};
use crate::error::{BindingError, EngineError};
use crate::geometry::{Geometry, Rect, Viewport};
use crate::ids::{ElementHandle, ElementId, FrameRequest, IdAllocator};
use crate::presets::PresetRegistry;
use crate::surface::{ElementTarget, FrameScheduler, RenderSurface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    Stopped,
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Frame counter value the tick ran with.
    pub frame: u64,
    /// Elements whose style was written.
    pub elements_updated: usize,
    /// Properties skipped this tick.
    pub errors: Vec<BindingError>,
    /// Elements that failed to re-resolve after a viewport resize; they keep
    /// their previous breakpoints.
    pub resolve_errors: Vec<EngineError>,
}

#[derive(Debug)]
pub struct Engine<S: RenderSurface, F: FrameScheduler> {
    cfg: Config,
    surface: S,
    scheduler: F,
    state: EngineState,
    frame: u64,
    viewport: Viewport,
    presets: PresetRegistry,
    ids: IdAllocator,
    drivers: IndexMap<String, Driver>,
    elements: IndexMap<ElementId, ElementBinding>,
    pending: Option<FrameRequest>,
    telemetry: Telemetry,
}

impl<S: RenderSurface, F: FrameScheduler> Engine<S, F> {
    pub fn new(cfg: Config, surface: S, scheduler: F) -> Self {
        let viewport = surface.viewport();
        let telemetry = Telemetry::new(cfg.debug, cfg.telemetry_window);
        Self {
            cfg,
            surface,
            scheduler,
            state: EngineState::Uninitialized,
            frame: 0,
            viewport,
            presets: PresetRegistry::builtin(),
            ids: IdAllocator::new(),
            drivers: IndexMap::new(),
            elements: IndexMap::new(),
            pending: None,
            telemetry,
        }
    }

    /// Register the frame driver, bind the surface's declared elements and
    /// request the first frame. `presets` are layered over the built-ins.
    pub fn init(&mut self, presets: PresetRegistry) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => return Err(EngineError::AlreadyRunning),
            EngineState::Stopped => return Err(EngineError::Stopped),
            EngineState::Uninitialized => {}
        }
        let mut registry = PresetRegistry::builtin();
        registry.extend(presets);
        let previous = std::mem::replace(&mut self.presets, registry);
        self.viewport = self.surface.viewport();

        // resolve every declared element before binding any of them
        let mut batches = Vec::new();
        for (handle, data) in self.surface.declared_elements() {
            match self.prepare(&ElementTarget::Handle(handle), &data) {
                Ok(batch) => batches.push(batch),
                Err(err) => {
                    self.presets = previous;
                    return Err(err);
                }
            }
        }

        let frame_driver = self.cfg.frame_driver.clone();
        self.add_driver(
            frame_driver,
            Box::new(|ctx: &SampleContext| ctx.tick as f64),
            DriverOptions::default(),
        )?;
        for batch in batches {
            self.commit(batch, &ElementOptions::default());
        }

        self.state = EngineState::Running;
        self.pending = Some(self.scheduler.request_frame());
        log::debug!(
            "scroll engine running: {} drivers, {} elements",
            self.drivers.len(),
            self.elements.len()
        );
        Ok(())
    }

    /// Register a driver. An existing driver with the same name is replaced in place.
    pub fn add_driver(
        &mut self,
        name: impl Into<String>,
        value_fn: ValueFn,
        options: DriverOptions,
    ) -> Result<(), EngineError> {
        self.ensure_not_stopped()?;
        let name = name.into();
        let ctx = self.sample_context();
        let driver = Driver::new(name.clone(), value_fn, &options, self.cfg.damping, &ctx);
        if self.drivers.contains_key(&name) {
            log::warn!("driver '{name}' re-registered; replacing previous producer");
        }
        // IndexMap::insert keeps the position of an existing key
        self.drivers.insert(name, driver);
        Ok(())
    }

    /// Remove a driver; returns whether it existed.
    pub fn remove_driver(&mut self, name: &str) -> bool {
        self.drivers.shift_remove(name).is_some()
    }

    /// Bind every element matched by `target`. Either all elements are bound or,
    /// if any breakpoint fails to resolve, none are.
    pub fn add_elements(
        &mut self,
        target: impl Into<ElementTarget>,
        animations: &AnimationsData,
        options: &ElementOptions,
    ) -> Result<Vec<ElementId>, EngineError> {
        self.ensure_not_stopped()?;
        let batch = self.prepare(&target.into(), animations)?;
        Ok(self.commit(batch, options))
    }

    /// Resolve a binding for every element matched by `target` without
    /// touching the engine's element table.
    fn prepare(
        &mut self,
        target: &ElementTarget,
        animations: &AnimationsData,
    ) -> Result<Vec<ElementBinding>, EngineError> {
        let handles = match target {
            ElementTarget::Selector(selector) => self.surface.query(selector),
            ElementTarget::Handle(handle) => vec![*handle],
        };
        if handles.is_empty() {
            log::debug!("no elements matched {target:?}");
        }

        // measure against the live scroll offsets, not the ones cached at the last tick
        let viewport = self.surface.viewport();
        let mut batch = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let geometry = measure(&self.surface, handle, viewport);
            let binding = ElementBinding::new(
                self.ids.alloc_element(),
                handle,
                target.clone(),
                index,
                animations,
                &self.presets,
                &geometry,
            )?;
            batch.push(binding);
        }
        Ok(batch)
    }

    fn commit(&mut self, batch: Vec<ElementBinding>, options: &ElementOptions) -> Vec<ElementId> {
        let mut ids = Vec::with_capacity(batch.len());
        for binding in batch {
            let handle = binding.handle();
            if let Some(transition) = &options.transition {
                self.surface.set_style(handle, "transition", transition);
            }
            if let Some(will_change) = &options.will_change {
                self.surface.set_style(handle, "will-change", will_change);
            }
            ids.push(binding.id());
            self.elements.insert(binding.id(), binding);
        }
        ids
    }

    /// Remove the bindings created for `target`: a selector removes everything
    /// added through that selector, a handle removes every binding of that element.
    pub fn remove_elements(&mut self, target: impl Into<ElementTarget>) -> usize {
        let before = self.elements.len();
        match target.into() {
            ElementTarget::Selector(selector) => self.elements.retain(|_, b| {
                !matches!(b.target(), ElementTarget::Selector(s) if *s == selector)
            }),
            ElementTarget::Handle(handle) => self.elements.retain(|_, b| b.handle() != handle),
        }
        before - self.elements.len()
    }

    pub fn remove_element(&mut self, id: ElementId) -> Result<(), EngineError> {
        self.elements
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(EngineError::UnknownElement(id))
    }

    /// Run one tick synchronously.
    pub fn tick(&mut self) -> Result<TickReport, EngineError> {
        self.ensure_not_stopped()?;
        let started = self.telemetry.enabled().then(Instant::now);

        let mut report = TickReport {
            frame: self.frame,
            ..TickReport::default()
        };

        let viewport = self.surface.viewport();
        let resized = viewport.size_differs(&self.viewport);
        self.viewport = viewport;
        if resized {
            log::debug!(
                "viewport resized to {}x{}; re-resolving {} elements",
                viewport.width,
                viewport.height,
                self.elements.len()
            );
            report.resolve_errors = self.recalculate_all();
            for err in &report.resolve_errors {
                log::error!("{err}");
            }
        }

        let ctx = self.sample_context();
        let mut samples: HashMap<String, DriverSample> = HashMap::with_capacity(self.drivers.len());
        for (name, driver) in self.drivers.iter_mut() {
            samples.insert(name.clone(), driver.sample(&ctx));
        }

        for binding in self.elements.values_mut() {
            let update = binding.update(&samples, self.frame);
            for err in &update.errors {
                log::error!("element {:?}: {err}", binding.id());
            }
            if !update.assignments.is_empty() {
                report.elements_updated += 1;
                for a in &update.assignments {
                    self.surface.set_style(binding.handle(), &a.property, &a.value);
                }
            }
            report.errors.extend(update.errors);
        }

        if let Some(started) = started {
            self.telemetry.record(self.frame, started.elapsed());
        }
        self.frame += 1;
        Ok(report)
    }

    /// Frame callback: run a tick and request the next frame. The next frame is
    /// requested even when the tick fails.
    pub fn on_animation_frame(&mut self) -> Result<TickReport, EngineError> {
        match self.state {
            EngineState::Running => {}
            EngineState::Uninitialized => return Err(EngineError::NotRunning),
            EngineState::Stopped => return Err(EngineError::Stopped),
        }
        self.pending = None;
        let result = self.tick();
        self.pending = Some(self.scheduler.request_frame());
        result
    }

    /// Host notification that the viewport changed; re-resolves every element now.
    pub fn on_resize(&mut self) -> Result<(), EngineError> {
        self.viewport = self.surface.viewport();
        self.refresh_geometry()
    }

    /// Re-resolve every element against current geometry. Every element is
    /// attempted; the first failure is returned.
    pub fn refresh_geometry(&mut self) -> Result<(), EngineError> {
        match self.recalculate_all().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn refresh_element(&mut self, id: ElementId) -> Result<(), EngineError> {
        let binding = self
            .elements
            .get_mut(&id)
            .ok_or(EngineError::UnknownElement(id))?;
        let geometry = measure(&self.surface, binding.handle(), self.surface.viewport());
        binding.recalculate(&geometry)
    }

    /// Cancel the outstanding frame and drop every driver and element.
    pub fn shutdown(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        self.drivers.clear();
        self.elements.clear();
        self.state = EngineState::Stopped;
        log::debug!("scroll engine stopped at frame {}", self.frame);
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementBinding> {
        self.elements.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementBinding> {
        self.elements.values()
    }

    /// Driver names in registration order.
    pub fn driver_names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    pub fn driver(&self, name: &str) -> Option<&Driver> {
        self.drivers.get(name)
    }

    pub fn last_average_ms(&self) -> Option<u64> {
        self.telemetry.last_average_ms()
    }

    fn ensure_not_stopped(&self) -> Result<(), EngineError> {
        if self.state == EngineState::Stopped {
            Err(EngineError::Stopped)
        } else {
            Ok(())
        }
    }

    fn sample_context(&self) -> SampleContext {
        SampleContext {
            tick: self.frame,
            viewport: self.viewport,
        }
    }

    fn recalculate_all(&mut self) -> Vec<EngineError> {
        let viewport = self.surface.viewport();
        let mut errors = Vec::new();
        for binding in self.elements.values_mut() {
            let geometry = measure(&self.surface, binding.handle(), viewport);
            if let Err(err) = binding.recalculate(&geometry) {
                errors.push(err);
            }
        }
        errors
    }
}

/// Document geometry of `handle`; a vanished element measures as an empty box at the origin.
fn measure<S: RenderSurface>(surface: &S, handle: ElementHandle, viewport: Viewport) -> Geometry {
    let rect = surface.bounds(handle).unwrap_or_else(|| {
        log::warn!("element {handle:?} has no bounds; using an empty box");
        Rect::default()
    });
    Geometry::new(rect, viewport)
}
