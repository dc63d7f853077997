#![allow(dead_code)]

use std::collections::HashMap;

use vizij_scroll_core::{
    AnimationsData, Config, ElementHandle, Engine, ManualScheduler, Rect, RenderSurface, Viewport,
};

/// Element of the mock page. `rect` is in document coordinates.
#[derive(Clone, Debug)]
pub struct MockElement {
    pub handle: ElementHandle,
    pub selector: Option<String>,
    pub rect: Rect,
    pub declared: Option<AnimationsData>,
    pub attached: bool,
}

/// In-memory page: a viewport, a list of elements and their written styles.
#[derive(Debug, Default)]
pub struct PageSurface {
    pub viewport: Viewport,
    pub elements: Vec<MockElement>,
    pub styles: HashMap<(u64, String), String>,
    pub writes: usize,
}

impl PageSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            ..Self::default()
        }
    }

    /// Build a page from a scene fixture, attaching declared animation fixtures.
    pub fn from_scene(name: &str) -> Self {
        let scene = vizij_test_fixtures::scenes::load(name).expect("load scene");
        let mut page = Self::new(scene.viewport.width, scene.viewport.height);
        page.viewport = page
            .viewport
            .with_scroll(scene.viewport.scroll_x, scene.viewport.scroll_y);
        for el in scene.elements {
            let [x, y, w, h] = el.rect;
            let declared = el.animations.as_deref().map(|fixture| {
                vizij_test_fixtures::animations::load::<AnimationsData>(fixture)
                    .expect("load animation fixture")
            });
            page.elements.push(MockElement {
                handle: ElementHandle(el.id),
                selector: el.selector,
                rect: Rect::new(x, y, w, h),
                declared,
                attached: true,
            });
        }
        page
    }

    pub fn add(&mut self, id: u64, selector: Option<&str>, rect: Rect) -> ElementHandle {
        let handle = ElementHandle(id);
        self.elements.push(MockElement {
            handle,
            selector: selector.map(str::to_string),
            rect,
            declared: None,
            attached: true,
        });
        handle
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.viewport.scroll_y = y;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn detach(&mut self, id: u64) {
        if let Some(el) = self.elements.iter_mut().find(|e| e.handle.0 == id) {
            el.attached = false;
        }
    }

    pub fn style(&self, id: u64, property: &str) -> Option<&str> {
        self.styles
            .get(&(id, property.to_string()))
            .map(String::as_str)
    }
}

impl RenderSurface for PageSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn bounds(&self, element: ElementHandle) -> Option<Rect> {
        self.elements
            .iter()
            .find(|e| e.handle == element && e.attached)
            .map(|e| {
                Rect::new(
                    e.rect.x - self.viewport.scroll_x,
                    e.rect.y - self.viewport.scroll_y,
                    e.rect.width,
                    e.rect.height,
                )
            })
    }

    fn query(&self, selector: &str) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .filter(|e| e.attached && e.selector.as_deref() == Some(selector))
            .map(|e| e.handle)
            .collect()
    }

    fn declared_elements(&self) -> Vec<(ElementHandle, AnimationsData)> {
        self.elements
            .iter()
            .filter_map(|e| e.declared.clone().map(|d| (e.handle, d)))
            .collect()
    }

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str) {
        self.writes += 1;
        self.styles
            .insert((element.0, property.to_string()), value.to_string());
    }
}

pub type TestEngine = Engine<PageSurface, ManualScheduler>;

pub fn engine(surface: PageSurface) -> TestEngine {
    Engine::new(Config::default(), surface, ManualScheduler::new())
}

pub fn run_ticks(engine: &mut TestEngine, n: usize) {
    for _ in 0..n {
        engine.tick().expect("tick");
    }
}

pub fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
