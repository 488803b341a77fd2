use super::{MountContext, Section};
use crate::anim::{fade_in_up_with, stagger_window, BreakpointTable, FadeState, Transition, Tween};
use crate::scroll::{InView, Region, ScrollMetrics, ScrollOffset, ScrollProgress};
use anyhow::Result;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemFrame {
    pub opacity: f32,
    pub scale: f32,
    pub symbol_opacity: f32,
    pub symbol_rotation: f32,
    pub reveal: FadeState,
}

#[derive(Debug)]
struct Item {
    title: &'static str,
    opacity: BreakpointTable<f32>,
    scale: BreakpointTable<f32>,
    symbol_opacity: BreakpointTable<f32>,
    symbol_rotation: BreakpointTable<f32>,
    reveal: Tween<FadeState>,
}

/// Pinned list where each item takes its turn in the spotlight as the
/// section scrolls through, with its symbol cross-fading and turning half a
/// revolution across its slice.
#[derive(Debug)]
pub struct Values {
    region: Region,
    progress: ScrollProgress,
    heading: Tween<FadeState>,
    trigger: InView,
    items: Vec<Item>,
}

impl Values {
    /// `transition` times the heading reveal; item `i` reveals after an
    /// extra `(i + 1) * stagger` seconds.
    pub fn new(
        region: Region,
        titles: &[&'static str],
        trigger: InView,
        transition: Transition,
        stagger: f32,
    ) -> Result<Self> {
        let count = titles.len();
        let slice = 1.0 / count.max(1) as f32;
        let items = titles
            .iter()
            .enumerate()
            .map(|(index, &title)| -> Result<Item> {
                let start = index as f32 * slice;
                Ok(Item {
                    title,
                    opacity: stagger_window(index, count, 0.1, 0.5, 1.0)?,
                    scale: stagger_window(index, count, 0.1, 0.95, 1.0)?,
                    symbol_opacity: BreakpointTable::new([
                        (start - slice * 0.5, 0.0),
                        (start, 1.0),
                        (start + slice * 0.5, 1.0),
                        (start + slice, 0.0),
                    ])?,
                    symbol_rotation: BreakpointTable::new([(start, 0.0), (start + slice, 180.0)])?,
                    reveal: fade_in_up_with(transition.stagger(index + 1, stagger)),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            region,
            progress: ScrollProgress::new(region, ScrollOffset::CONTAINED),
            heading: fade_in_up_with(transition),
            trigger,
            items,
        })
    }

    pub fn progress(&self) -> f32 {
        self.progress.progress()
    }

    pub fn heading(&mut self, now: f32) -> FadeState {
        self.heading.sample(now)
    }

    pub fn item_frames(&mut self, now: f32) -> Vec<ItemFrame> {
        let p = self.progress.progress();
        self.items
            .iter_mut()
            .map(|item| ItemFrame {
                opacity: item.opacity.sample(p),
                scale: item.scale.sample(p),
                symbol_opacity: item.symbol_opacity.sample(p),
                symbol_rotation: item.symbol_rotation.sample(p),
                reveal: item.reveal.sample(now),
            })
            .collect()
    }

    /// Index of the item currently in the spotlight.
    pub fn active_item(&self) -> usize {
        let p = self.progress.progress();
        self.items
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.opacity.sample(p).total_cmp(&b.opacity.sample(p)))
            .map_or(0, |(index, _)| index)
    }
}

impl Section for Values {
    fn name(&self) -> &'static str {
        "values"
    }

    fn region(&self) -> Region {
        self.region
    }

    fn set_region(&mut self, region: Region) {
        self.region = region;
        self.progress.set_region(region);
    }

    fn mount(&mut self, ctx: &MountContext<'_>) -> Result<()> {
        self.progress.attach(ctx.hub);
        info!("values mounted with {} items", self.items.len());
        Ok(())
    }

    fn unmount(&mut self) {
        self.progress.detach();
    }

    fn is_mounted(&self) -> bool {
        self.progress.is_attached()
    }

    fn update(&mut self, now: f32, metrics: ScrollMetrics) {
        if self.trigger.observe(self.region, metrics) && !self.heading.is_started() {
            debug!("values revealed at {now:.2}");
            self.heading.start(now);
            for item in &mut self.items {
                item.reveal.start(now);
            }
        }
    }

    fn describe(&self) -> String {
        let active = self.active_item();
        let title = self.items.get(active).map_or("-", |item| item.title);
        format!("values: progress {:.2} spotlight {title}", self.progress())
    }
}
