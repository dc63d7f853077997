//! Host traits: the rendering surface that owns elements, and the frame scheduler.
//!
//! Adapters implement these and hand them to [`crate::Engine`]. The core never
//! owns elements; it refers to them through [`ElementHandle`]s.

use crate::data::AnimationsData;
use crate::geometry::{Rect, Viewport};
use crate::ids::{ElementHandle, FrameRequest};

pub trait RenderSurface {
    /// Current viewport size and scroll offsets.
    fn viewport(&self) -> Viewport;

    /// Viewport-relative bounding box, or `None` if the element no longer exists.
    fn bounds(&self, element: ElementHandle) -> Option<Rect>;

    /// Elements matching `selector`, in document order.
    fn query(&self, selector: &str) -> Vec<ElementHandle>;

    /// Elements carrying pre-parsed declarative animation data, bound by `init`.
    fn declared_elements(&self) -> Vec<(ElementHandle, AnimationsData)> {
        Vec::new()
    }

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str);
}

/// "Call me once before the next repaint" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Scheduler for hosts that drive frames from their own loop: it only records
/// the outstanding request, and the host calls
/// [`crate::Engine::on_animation_frame`] when it repaints.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameRequest>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let req = FrameRequest(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending = Some(req);
        req
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Which elements an `add_elements` / `remove_elements` call refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementTarget {
    Selector(String),
    Handle(ElementHandle),
}

impl From<&str> for ElementTarget {
    fn from(s: &str) -> Self {
        ElementTarget::Selector(s.to_string())
    }
}

impl From<String> for ElementTarget {
    fn from(s: String) -> Self {
        ElementTarget::Selector(s)
    }
}

impl From<ElementHandle> for ElementTarget {
    fn from(h: ElementHandle) -> Self {
        ElementTarget::Handle(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_tracks_single_request() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        assert_ne!(a, b);
        assert_eq!(s.pending(), Some(b));
        s.cancel_frame(a);
        assert_eq!(s.pending(), Some(b));
        s.cancel_frame(b);
        assert_eq!(s.pending(), None);
        assert_eq!(s.cancelled(), 1);
    }
}
