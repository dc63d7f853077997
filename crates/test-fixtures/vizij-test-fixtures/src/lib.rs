//! Shared JSON fixtures for the scroll crates.
//!
//! `fixtures/manifest.json` maps fixture names to files under `fixtures/`:
//! - `animations`: per-element animation documents (driver -> bindings)
//! - `scenes`: mock pages (viewport plus element boxes) to bind them against

use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    animations: IndexMap<String, String>,
    scenes: IndexMap<String, String>,
}

/// One section of the manifest.
#[derive(Clone, Copy, Debug)]
enum Kind {
    Animation,
    Scene,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Animation => "animation",
            Kind::Scene => "scene",
        }
    }

    fn entries(self) -> &'static IndexMap<String, String> {
        match self {
            Kind::Animation => &MANIFEST.animations,
            Kind::Scene => &MANIFEST.scenes,
        }
    }

    fn names(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .with_context(|| format!("unknown {} fixture '{name}'", self.label()))?;
        Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.label(), path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing {} fixture '{name}'", self.label()))
    }
}

pub mod animations {
    use super::*;

    /// Fixture names in manifest order.
    pub fn keys() -> Vec<String> {
        Kind::Animation.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Animation.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Animation.parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Animation.path(name)
    }
}

pub mod scenes {
    use super::*;

    /// Viewport size and scroll offsets of a mock page.
    #[derive(Clone, Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SceneViewport {
        pub width: f64,
        pub height: f64,
        #[serde(default)]
        pub scroll_x: f64,
        #[serde(default)]
        pub scroll_y: f64,
    }

    /// One element of a mock page: matched by `selector`, positioned by its
    /// document box `[x, y, width, height]`. `animations` names an animation
    /// fixture the page declares for the element.
    #[derive(Clone, Debug, Deserialize)]
    pub struct SceneElement {
        pub id: u64,
        #[serde(default)]
        pub selector: Option<String>,
        pub rect: [f64; 4],
        #[serde(default)]
        pub animations: Option<String>,
    }

    #[derive(Clone, Debug, Deserialize)]
    pub struct Scene {
        pub viewport: SceneViewport,
        pub elements: Vec<SceneElement>,
    }

    pub fn keys() -> Vec<String> {
        Kind::Scene.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Scene.text(name)
    }

    pub fn load(name: &str) -> Result<Scene> {
        Kind::Scene.parse(name)
    }
}
