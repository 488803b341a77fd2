use crate::anim::SpringParams;
use crate::config::Config;
use crate::features::hero::Hero;
use crate::features::stats::Stats;
use crate::features::values::Values;
use crate::features::{MountContext, Section};
use crate::host::FrameHandle;
use crate::scroll::{InView, PageProgress, Region, ScrollHub, ScrollMetrics};
use anyhow::Result;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageMode {
    /// Built but not yet observing layout; every progress reads 0.
    Placeholder,
    Mounted,
    Unmounted,
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    Scroll { delta: f32 },
    ScrollTo(f32),
    Resize { viewport_height: f32 },
}

/// Section boxes for a given viewport height, stacked top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub hero: Region,
    pub stats: Region,
    pub values: Region,
    pub document_height: f32,
}

impl Layout {
    const STATS_HEIGHT: f32 = 600.0;
    const FOOTER_HEIGHT: f32 = 400.0;

    /// The hero fills one viewport and the values list is pinned for five.
    pub fn for_viewport(viewport_height: f32) -> Self {
        let hero = Region::new(0.0, viewport_height);
        let stats = Region::new(hero.bottom(), Self::STATS_HEIGHT);
        let values = Region::new(stats.bottom(), viewport_height * 5.0);
        Self {
            hero,
            stats,
            values,
            document_height: values.bottom() + Self::FOOTER_HEIGHT,
        }
    }

    fn regions(&self) -> [Region; 3] {
        [self.hero, self.stats, self.values]
    }
}

/// The landing page: sections stacked top to bottom, a reading-progress bar,
/// and the scroll hub they all observe.
pub struct Page {
    pub config: Config,
    pub mode: PageMode,
    hub: ScrollHub,
    header: PageProgress,
    sections: Vec<Box<dyn Section>>,
    document_height: f32,
}

impl Page {
    pub const VALUE_TITLES: [&'static str; 4] = ["arion", "augur", "colossoria", "erebus"];

    pub fn new(config: Config) -> Result<Self> {
        let viewport_height = config.demo.viewport_height;
        let layout = Layout::for_viewport(viewport_height);

        let trigger = InView::new(config.reveal.margin, config.reveal.threshold, config.reveal.once);
        let sections: Vec<Box<dyn Section>> = vec![
            Box::new(Hero::new(layout.hero, config.spring)?),
            Box::new(Stats::headline(
                layout.stats,
                config.counter_duration(),
                config.counter.easing,
                trigger.clone(),
            )),
            Box::new(Values::new(
                layout.values,
                &Self::VALUE_TITLES,
                trigger,
                config.reveal_transition(),
                config.reveal_stagger(),
            )?),
        ];

        Ok(Self {
            hub: ScrollHub::new(ScrollMetrics::new(viewport_height, layout.document_height)),
            header: PageProgress::new(),
            sections,
            document_height: layout.document_height,
            mode: PageMode::Placeholder,
            config,
        })
    }

    pub fn hub(&self) -> &ScrollHub {
        &self.hub
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    pub fn sections(&self) -> &[Box<dyn Section>] {
        &self.sections
    }

    /// Second phase of construction: attach every section once the host can
    /// report real layout.
    pub fn mount(&mut self, frames: &FrameHandle) -> Result<()> {
        if self.mode == PageMode::Mounted {
            return Ok(());
        }
        let ctx = MountContext {
            hub: &self.hub,
            frames,
            config: &self.config,
        };
        let mounted = self
            .sections
            .iter_mut()
            .try_for_each(|section| section.mount(&ctx));
        if let Err(err) = mounted {
            for section in &mut self.sections {
                section.unmount();
            }
            return Err(err);
        }
        self.header.attach(&self.hub);
        self.mode = PageMode::Mounted;
        info!(
            "page mounted: {} sections, document {}px, {} listeners",
            self.sections.len(),
            self.document_height,
            self.hub.listener_count()
        );
        Ok(())
    }

    pub fn unmount(&mut self) {
        for section in &mut self.sections {
            section.unmount();
        }
        self.header.detach();
        if self.mode == PageMode::Mounted {
            self.mode = PageMode::Unmounted;
        }
        let leaked = self.hub.listener_count();
        if leaked > 0 {
            warn!("{leaked} scroll listeners still registered after unmount");
        } else {
            info!("page unmounted cleanly");
        }
    }

    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Scroll { delta } => self.hub.scroll_by(delta),
            PageEvent::ScrollTo(y) => self.hub.scroll_to(y),
            PageEvent::Resize { viewport_height } => self.relayout(viewport_height),
        }
    }

    /// Re-stacks every section for the new viewport, then republishes
    /// metrics so attached sources pick up both changes.
    fn relayout(&mut self, viewport_height: f32) {
        if !(viewport_height.is_finite() && viewport_height > 0.0) {
            warn!("ignoring resize to {viewport_height}px");
            return;
        }
        let layout = Layout::for_viewport(viewport_height);
        for (section, region) in self.sections.iter_mut().zip(layout.regions()) {
            section.set_region(region);
        }
        self.document_height = layout.document_height;
        info!("viewport resized to {viewport_height}px, document now {}px", self.document_height);
        self.hub.resize(viewport_height, self.document_height);
    }

    pub fn update(&mut self, now: f32) {
        if self.mode != PageMode::Mounted {
            return;
        }
        self.header.on_frame();
        let metrics = self.hub.metrics();
        for section in &mut self.sections {
            section.update(now, metrics);
        }
    }

    pub fn reading_progress(&self) -> f32 {
        self.header.percent()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "scroll {:.0}px, read {:.0}%",
            self.hub.metrics().scroll_y,
            self.reading_progress()
        )];
        lines.extend(self.sections.iter().map(|s| s.describe()));
        lines.join("\n  ")
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if self.mode == PageMode::Mounted {
            self.unmount();
        }
    }
}

/// Spring parameters are validated once at startup so a misconfigured file
/// is reported rather than silently turning smoothing off.
pub fn check_spring(params: SpringParams) {
    if !params.is_valid() {
        warn!("spring {params:?} is degenerate, scroll smoothing disabled");
    } else if params.damping_ratio() < 1.0 {
        info!("spring is underdamped (ratio {:.2}), values may overshoot", params.damping_ratio());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FrameLoop;
    use std::time::Duration;

    #[test]
    fn sections_stack_into_document() {
        let page = Page::new(Config::default()).unwrap();
        let regions: Vec<Region> = page.sections().iter().map(|s| s.region()).collect();
        assert_eq!(regions[0], Region::new(0.0, 900.0));
        assert_eq!(regions[1].top, 900.0);
        assert_eq!(regions[2].top, 1500.0);
        assert_eq!(page.document_height(), 1500.0 + 4500.0 + 400.0);
    }

    #[test]
    fn placeholder_page_registers_nothing() {
        let mut page = Page::new(Config::default()).unwrap();
        assert_eq!(page.mode, PageMode::Placeholder);
        assert_eq!(page.hub().listener_count(), 0);
        page.handle_event(PageEvent::ScrollTo(2000.0));
        page.update(0.0);
        assert_eq!(page.reading_progress(), 0.0);
    }

    #[test]
    fn mount_and_unmount_balance_listeners() {
        let mut frames = FrameLoop::new(120).unwrap();
        let mut page = Page::new(Config::default()).unwrap();
        page.mount(&frames.handle()).unwrap();
        // Hero + 3 counters + values + header.
        assert_eq!(page.hub().listener_count(), 6);

        page.handle_event(PageEvent::Scroll { delta: 1200.0 });
        frames.run_for(Duration::from_millis(20)).unwrap();
        page.update(0.1);
        assert!(page.reading_progress() > 0.0);

        page.unmount();
        assert_eq!(page.mode, PageMode::Unmounted);
        assert_eq!(page.hub().listener_count(), 0);
    }

    #[test]
    fn resize_keeps_scroll_in_range() {
        let mut page = Page::new(Config::default()).unwrap();
        page.handle_event(PageEvent::ScrollTo(1.0e9));
        let max = page.hub().metrics().max_scroll();
        assert_eq!(page.hub().metrics().scroll_y, max);
        page.handle_event(PageEvent::Resize { viewport_height: 500.0 });
        assert_eq!(page.hub().metrics().scroll_y, page.document_height() - 500.0);
    }

    #[test]
    fn resize_restacks_sections() {
        let mut frames = FrameLoop::new(120).unwrap();
        let mut page = Page::new(Config::default()).unwrap();
        page.mount(&frames.handle()).unwrap();
        page.handle_event(PageEvent::Resize { viewport_height: 1200.0 });

        let regions: Vec<Region> = page.sections().iter().map(|s| s.region()).collect();
        assert_eq!(regions[0], Region::new(0.0, 1200.0));
        assert_eq!(regions[1].top, 1200.0);
        assert_eq!(regions[2], Region::new(1800.0, 6000.0));
        assert_eq!(page.document_height(), 1800.0 + 6000.0 + 400.0);
        assert_eq!(page.hub().metrics().document_height, page.document_height());

        page.handle_event(PageEvent::Resize { viewport_height: f32::NAN });
        assert_eq!(page.hub().metrics().viewport_height, 1200.0);
        frames.run_for(Duration::from_millis(5)).unwrap();
    }
}
