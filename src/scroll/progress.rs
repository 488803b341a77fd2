use super::hub::{ListenerGuard, ScrollHub};
use super::offset::ScrollOffset;
use super::{Region, ScrollMetrics};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Progress of `metrics.scroll_y` through the scroll range that `offset`
/// defines for `region`. Degenerate regions and ranges read 0.
pub fn region_progress(region: Region, offset: ScrollOffset, metrics: ScrollMetrics) -> f32 {
    if !region.has_extent() || !metrics.scroll_y.is_finite() {
        return 0.0;
    }
    let scroll_at = |edge: super::Intersection| {
        region.top + edge.target.resolve(region.height) - edge.container.resolve(metrics.viewport_height)
    };
    let from = scroll_at(offset.from);
    let span = scroll_at(offset.to) - from;
    if !(span.is_finite() && span > 0.0) {
        return 0.0;
    }
    ((metrics.scroll_y - from) / span).clamp(0.0, 1.0)
}

#[derive(Debug)]
struct Tracked {
    region: Region,
    offset: ScrollOffset,
    metrics: Option<ScrollMetrics>,
    progress: f32,
}

impl Tracked {
    fn recompute(&mut self) {
        self.progress = match self.metrics {
            Some(metrics) => region_progress(self.region, self.offset, metrics),
            None => 0.0,
        };
    }
}

/// Scroll progress of one element. Constructed detached, reading 0, and
/// tracks the viewport only while attached to a hub.
#[derive(Debug)]
pub struct ScrollProgress {
    tracked: Rc<RefCell<Tracked>>,
    guard: Option<ListenerGuard>,
}

impl ScrollProgress {
    pub fn new(region: Region, offset: ScrollOffset) -> Self {
        Self {
            tracked: Rc::new(RefCell::new(Tracked {
                region,
                offset,
                metrics: None,
                progress: 0.0,
            })),
            guard: None,
        }
    }

    pub fn attach(&mut self, hub: &ScrollHub) {
        self.detach();
        {
            let mut tracked = self.tracked.borrow_mut();
            tracked.metrics = Some(hub.metrics());
            tracked.recompute();
        }
        let weak = Rc::downgrade(&self.tracked);
        self.guard = Some(hub.listen(move |metrics| {
            if let Some(tracked) = weak.upgrade() {
                let mut tracked = tracked.borrow_mut();
                tracked.metrics = Some(*metrics);
                tracked.recompute();
            }
        }));
    }

    /// Stops tracking; the last progress stays readable.
    pub fn detach(&mut self) {
        if self.guard.take().is_some() {
            debug!("scroll progress detached at {:.3}", self.progress());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.guard.is_some()
    }

    /// Replaces the element's layout box, e.g. after a relayout.
    pub fn set_region(&mut self, region: Region) {
        let mut tracked = self.tracked.borrow_mut();
        tracked.region = region;
        tracked.recompute();
    }

    pub fn region(&self) -> Region {
        self.tracked.borrow().region
    }

    pub fn progress(&self) -> f32 {
        self.tracked.borrow().progress
    }
}

#[derive(Debug, Default)]
struct PageState {
    metrics: ScrollMetrics,
    dirty: bool,
}

/// Scroll progress of the whole document, recomputed at most once per frame
/// no matter how many scroll events arrived in between.
#[derive(Debug, Default)]
pub struct PageProgress {
    state: Rc<RefCell<PageState>>,
    guard: Option<ListenerGuard>,
    progress: f32,
    recomputes: u64,
}

impl PageProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, hub: &ScrollHub) {
        self.detach();
        {
            let mut state = self.state.borrow_mut();
            state.metrics = hub.metrics();
            state.dirty = true;
        }
        let weak = Rc::downgrade(&self.state);
        self.guard = Some(hub.listen(move |metrics| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                state.metrics = *metrics;
                state.dirty = true;
            }
        }));
        self.on_frame();
    }

    pub fn detach(&mut self) {
        self.guard = None;
    }

    pub fn is_attached(&self) -> bool {
        self.guard.is_some()
    }

    /// Applies pending scroll events. Returns true when progress was
    /// recomputed.
    pub fn on_frame(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.dirty {
            return false;
        }
        state.dirty = false;
        let metrics = state.metrics;
        let range = metrics.max_scroll();
        self.progress = if range > 0.0 && metrics.scroll_y.is_finite() {
            (metrics.scroll_y / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.recomputes += 1;
        true
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn percent(&self) -> f32 {
        self.progress * 100.0
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
