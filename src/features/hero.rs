use super::{MountContext, Section};
use crate::anim::{BreakpointTable, Offset, Smooth, Spring, SpringParams};
use crate::host::{FrameAction, FrameGuard};
use crate::scroll::{Region, ScrollMetrics, ScrollOffset, ScrollProgress};
use anyhow::Result;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroFrame {
    pub progress: f32,
    pub smoothed: f32,
    pub opacity: f32,
    pub background: Offset,
    pub content: Offset,
    pub chaos: f32,
}

#[derive(Debug)]
struct Motion {
    source: ScrollProgress,
    spring: Spring,
    last_tick: Option<f32>,
}

impl Motion {
    fn tick(&mut self, now: f32) {
        let dt = self.last_tick.map_or(0.0, |last| now - last);
        self.last_tick = Some(now);
        self.spring.step(self.source.progress(), dt);
    }
}

/// Parallax banner: background and content drift up at different rates and
/// the copy fades out over the first half of the scroll, all driven by a
/// spring-smoothed scroll progress.
#[derive(Debug)]
pub struct Hero {
    region: Region,
    motion: Rc<RefCell<Motion>>,
    ticker: Option<FrameGuard>,
    background_y: BreakpointTable<Offset>,
    content_y: BreakpointTable<Offset>,
    opacity: BreakpointTable<f32>,
    chaos: BreakpointTable<f32>,
}

impl Hero {
    pub fn new(region: Region, spring: SpringParams) -> Result<Self> {
        Ok(Self {
            region,
            motion: Rc::new(RefCell::new(Motion {
                source: ScrollProgress::new(region, ScrollOffset::SCROLL_PAST),
                spring: Spring::new(spring, 0.0),
                last_tick: None,
            })),
            ticker: None,
            background_y: BreakpointTable::new([(0.0, Offset::ZERO), (1.0, Offset::new(0.0, -200.0))])?,
            content_y: BreakpointTable::new([(0.0, Offset::ZERO), (1.0, Offset::new(0.0, -100.0))])?,
            opacity: BreakpointTable::new([(0.0, 1.0), (0.5, 0.0)])?,
            chaos: BreakpointTable::new([(0.0, 0.0), (0.8, 1.0)])?,
        })
    }

    pub fn frame(&self) -> HeroFrame {
        let motion = self.motion.borrow();
        let smoothed = motion.spring.value();
        HeroFrame {
            progress: motion.source.progress(),
            smoothed,
            opacity: self.opacity.sample(smoothed),
            background: self.background_y.sample(smoothed),
            content: self.content_y.sample(smoothed),
            chaos: self.chaos.sample(smoothed),
        }
    }
}

impl Section for Hero {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn region(&self) -> Region {
        self.region
    }

    fn set_region(&mut self, region: Region) {
        self.region = region;
        self.motion.borrow_mut().source.set_region(region);
    }

    fn mount(&mut self, ctx: &MountContext<'_>) -> Result<()> {
        self.unmount();
        {
            let mut motion = self.motion.borrow_mut();
            motion.source.attach(ctx.hub);
            let start = motion.source.progress();
            motion.spring = Spring::new(ctx.config.smoothing(), start);
            motion.last_tick = None;
        }
        let weak = Rc::downgrade(&self.motion);
        self.ticker = Some(ctx.frames.on_frame(move |now| match weak.upgrade() {
            Some(motion) => {
                motion.borrow_mut().tick(now);
                FrameAction::Continue
            }
            None => FrameAction::Stop,
        })?);
        info!("hero mounted");
        Ok(())
    }

    fn unmount(&mut self) {
        self.ticker = None;
        self.motion.borrow_mut().source.detach();
    }

    fn is_mounted(&self) -> bool {
        self.ticker.is_some()
    }

    fn update(&mut self, _now: f32, _metrics: ScrollMetrics) {}

    fn describe(&self) -> String {
        let frame = self.frame();
        format!(
            "hero: progress {:.2} smoothed {:.2} opacity {:.2} bg {:+.0}px content {:+.0}px",
            frame.progress, frame.smoothed, frame.opacity, frame.background.y, frame.content.y
        )
    }
}
