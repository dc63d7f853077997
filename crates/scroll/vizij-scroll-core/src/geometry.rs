//! Element and viewport geometry used by breakpoint expressions.

use serde::{Deserialize, Serialize};

/// Viewport-relative bounding box of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Visible area of the document plus its scroll offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn with_scroll(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    /// Width/height differ; scroll offsets are ignored.
    pub fn size_differs(&self, other: &Viewport) -> bool {
        self.width != other.width || self.height != other.height
    }
}

/// Element box in document coordinates together with the viewport it was measured in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub viewport: Viewport,
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

impl Geometry {
    pub fn new(rect: Rect, viewport: Viewport) -> Self {
        Self {
            viewport,
            width: rect.width,
            height: rect.height,
            left: rect.x + viewport.scroll_x,
            top: rect.y + viewport.scroll_y,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
