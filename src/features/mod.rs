pub mod hero;
pub mod stats;
pub mod values;

use crate::config::Config;
use crate::host::FrameHandle;
use crate::scroll::{Region, ScrollHub, ScrollMetrics};
use anyhow::Result;

/// What a section needs from the host while mounted.
pub struct MountContext<'a> {
    pub hub: &'a ScrollHub,
    pub frames: &'a FrameHandle,
    pub config: &'a Config,
}

/// A page section owning its own progress sources and timers.
///
/// `mount` registers every listener and timer the section needs; `unmount`
/// releases all of them and must be safe to call more than once.
pub trait Section {
    fn name(&self) -> &'static str;
    fn region(&self) -> Region;
    /// Moves the section after a relayout; attached sources recompute.
    fn set_region(&mut self, region: Region);
    fn mount(&mut self, ctx: &MountContext<'_>) -> Result<()>;
    fn unmount(&mut self);
    fn is_mounted(&self) -> bool;
    fn update(&mut self, now: f32, metrics: ScrollMetrics);
    fn describe(&self) -> String;
}
