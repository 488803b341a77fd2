//! Scroll-driven progress sources.
//!
//! The host owns a [`ScrollHub`] and publishes [`ScrollMetrics`] to it on
//! every scroll or resize. Progress sources attach a passive listener to the
//! hub and hold the returned [`ListenerGuard`]; dropping the guard (or the
//! source that owns it) deregisters the listener.

pub mod hub;
pub mod in_view;
pub mod offset;
pub mod progress;

pub use hub::{ListenerGuard, ScrollHub};
pub use in_view::{InView, Margin};
pub use offset::{Edge, Intersection, ParseOffsetError, ScrollOffset};
pub use progress::{PageProgress, ScrollProgress};

/// Viewport state in CSS pixels, along the vertical scroll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f32,
    pub viewport_height: f32,
    pub document_height: f32,
}

impl ScrollMetrics {
    pub fn new(viewport_height: f32, document_height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            viewport_height,
            document_height,
        }
    }

    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

impl Default for ScrollMetrics {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// An element's layout box along the scroll axis, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub top: f32,
    pub height: f32,
}

impl Region {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// False for zero, negative or non-finite heights.
    pub fn has_extent(&self) -> bool {
        self.top.is_finite() && self.height.is_finite() && self.height > 0.0
    }
}
