//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Engine-side id of one element binding.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Opaque handle of an element owned by the rendering surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Token for one outstanding frame callback registration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameRequest(pub u64);

/// Monotonic allocator for ElementId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }
}
