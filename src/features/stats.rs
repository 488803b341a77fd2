use super::{MountContext, Section};
use crate::anim::{CounterAnimator, Easing};
use crate::host::{FrameAction, FrameGuard, FrameHandle};
use crate::scroll::{InView, ListenerGuard, Region, ScrollMetrics};
use anyhow::Result;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct Shared {
    counter: CounterAnimator,
    trigger: InView,
    region: Region,
    ticker: Option<FrameGuard>,
}

/// One headline number that counts up the first time it scrolls into view.
///
/// The counter owns its scroll listener and, while running, its own frame
/// callback; both are released on unmount or drop.
#[derive(Debug)]
pub struct CountUp {
    pub label: &'static str,
    shared: Rc<RefCell<Shared>>,
    listener: Option<ListenerGuard>,
}

impl CountUp {
    pub fn new(label: &'static str, counter: CounterAnimator, trigger: InView, region: Region) -> Self {
        Self {
            label,
            shared: Rc::new(RefCell::new(Shared {
                counter,
                trigger,
                region,
                ticker: None,
            })),
            listener: None,
        }
    }

    pub fn mount(&mut self, ctx: &MountContext<'_>) -> Result<()> {
        self.unmount();
        observe(&self.shared, ctx.hub.metrics(), ctx.frames)?;
        let weak = Rc::downgrade(&self.shared);
        let frames = ctx.frames.clone();
        let label = self.label;
        self.listener = Some(ctx.hub.listen(move |metrics| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if let Err(err) = observe(&shared, *metrics, &frames) {
                warn!("{label}: could not start counter: {err:#}");
            }
        }));
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.listener = None;
        self.shared.borrow_mut().ticker = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    pub fn set_region(&mut self, region: Region) {
        self.shared.borrow_mut().region = region;
    }

    pub fn is_ticking(&self) -> bool {
        self.shared
            .borrow()
            .ticker
            .as_ref()
            .is_some_and(FrameGuard::is_active)
    }

    pub fn value(&self) -> f64 {
        self.shared.borrow().counter.value()
    }

    pub fn formatted(&self) -> String {
        self.shared.borrow().counter.formatted()
    }
}

fn observe(shared: &Rc<RefCell<Shared>>, metrics: ScrollMetrics, frames: &FrameHandle) -> Result<()> {
    let mut state = shared.borrow_mut();
    let region = state.region;
    let visible = state.trigger.observe(region, metrics);
    state.counter.set_trigger(visible, frames.clock().now());

    let ticking = state.ticker.as_ref().is_some_and(FrameGuard::is_active);
    if state.counter.is_running() && !ticking {
        let weak = Rc::downgrade(shared);
        state.ticker = Some(frames.on_frame(move |now| {
            let Some(shared) = weak.upgrade() else {
                return FrameAction::Stop;
            };
            let mut state = shared.borrow_mut();
            state.counter.tick(now);
            if state.counter.is_running() {
                FrameAction::Continue
            } else {
                FrameAction::Stop
            }
        })?);
    }
    Ok(())
}

/// Row of headline numbers.
#[derive(Debug)]
pub struct Stats {
    region: Region,
    counters: Vec<CountUp>,
}

impl Stats {
    pub fn new(region: Region, counters: Vec<CountUp>) -> Self {
        Self { region, counters }
    }

    /// The page's default figures, sharing one trigger configuration.
    pub fn headline(region: Region, duration: f32, easing: Easing, trigger: InView) -> Self {
        let counter = |label: &'static str, end: f64, decimals: u32| {
            CountUp::new(
                label,
                CounterAnimator::new(0.0, end, duration)
                    .with_easing(easing)
                    .with_decimals(decimals),
                trigger.clone(),
                region,
            )
        };
        Self::new(
            region,
            vec![
                counter("players", 12_000.0, 0),
                counter("markets", 48.0, 0),
                counter("uptime", 99.9, 1),
            ],
        )
    }

    pub fn counters(&self) -> &[CountUp] {
        &self.counters
    }
}

impl Section for Stats {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn region(&self) -> Region {
        self.region
    }

    fn set_region(&mut self, region: Region) {
        self.region = region;
        for counter in &mut self.counters {
            counter.set_region(region);
        }
    }

    fn mount(&mut self, ctx: &MountContext<'_>) -> Result<()> {
        for counter in &mut self.counters {
            counter.mount(ctx)?;
        }
        info!("stats mounted with {} counters", self.counters.len());
        Ok(())
    }

    fn unmount(&mut self) {
        for counter in &mut self.counters {
            counter.unmount();
        }
    }

    fn is_mounted(&self) -> bool {
        self.counters.iter().any(CountUp::is_mounted)
    }

    fn update(&mut self, _now: f32, _metrics: ScrollMetrics) {}

    fn describe(&self) -> String {
        let figures: Vec<String> = self
            .counters
            .iter()
            .map(|c| format!("{} {}", c.label, c.formatted()))
            .collect();
        format!("stats: {}", figures.join(", "))
    }
}
