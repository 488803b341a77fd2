use super::{Region, ScrollMetrics};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grows (positive) or shrinks (negative) the viewport on every side
/// before testing intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Margin {
    Pixels(f32),
    /// Percent of the viewport height.
    Percent(f32),
}

impl Margin {
    pub fn resolve(self, viewport_height: f32) -> f32 {
        match self {
            Margin::Pixels(px) => px,
            Margin::Percent(pct) => viewport_height * pct / 100.0,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Pixels(0.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid margin {0:?}, expected e.g. \"-100px\" or \"-20%\"")]
pub struct ParseMarginError(pub String);

impl FromStr for Margin {
    type Err = ParseMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseMarginError(s.to_string());
        if let Some(pct) = s.strip_suffix('%') {
            pct.trim().parse().map(Margin::Percent).map_err(|_| err())
        } else {
            let px = s.strip_suffix("px").unwrap_or(s);
            px.trim().parse().map(Margin::Pixels).map_err(|_| err())
        }
    }
}

impl TryFrom<String> for Margin {
    type Error = ParseMarginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Margin> for String {
    fn from(margin: Margin) -> Self {
        margin.to_string()
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margin::Pixels(px) => write!(f, "{px}px"),
            Margin::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Fraction of `region` inside the viewport after applying `margin`.
pub fn visible_fraction(region: Region, metrics: ScrollMetrics, margin: Margin) -> f32 {
    let inset = margin.resolve(metrics.viewport_height);
    let top = metrics.scroll_y - inset;
    let bottom = metrics.scroll_y + metrics.viewport_height + inset;
    if bottom <= top || !region.top.is_finite() {
        return 0.0;
    }
    if !region.has_extent() {
        return if (top..=bottom).contains(&region.top) { 1.0 } else { 0.0 };
    }
    let overlap = region.bottom().min(bottom) - region.top.max(top);
    (overlap / region.height).clamp(0.0, 1.0)
}

/// Animation trigger fed by intersection observations.
///
/// With `once` set, the first positive observation latches the trigger and
/// later observations are ignored.
#[derive(Debug, Clone)]
pub struct InView {
    pub margin: Margin,
    pub threshold: f32,
    pub once: bool,
    in_view: bool,
}

impl InView {
    pub fn new(margin: Margin, threshold: f32, once: bool) -> Self {
        Self {
            margin,
            threshold: threshold.clamp(0.0, 1.0),
            once,
            in_view: false,
        }
    }

    pub fn once() -> Self {
        Self::new(Margin::default(), 0.0, true)
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    pub fn observe(&mut self, region: Region, metrics: ScrollMetrics) -> bool {
        if self.once && self.in_view {
            return true;
        }
        let fraction = visible_fraction(region, metrics, self.margin);
        let intersecting = if self.threshold <= 0.0 {
            fraction > 0.0
        } else {
            fraction >= self.threshold
        };
        if intersecting != self.in_view {
            debug!("region at {} {} view", region.top, if intersecting { "entered" } else { "left" });
        }
        self.in_view = intersecting;
        self.in_view
    }

    /// Forgets a latched observation so the trigger can fire again.
    pub fn rearm(&mut self) {
        self.in_view = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(scroll_y: f32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_y,
            viewport_height: 1000.0,
            document_height: 10_000.0,
        }
    }

    #[rstest]
    #[case("-100px", Margin::Pixels(-100.0))]
    #[case("-20%", Margin::Percent(-20.0))]
    #[case("0", Margin::Pixels(0.0))]
    #[case(" 50px ", Margin::Pixels(50.0))]
    fn parses_margins(#[case] input: &str, #[case] expected: Margin) {
        assert_eq!(input.parse::<Margin>(), Ok(expected));
    }

    #[test]
    fn rejects_garbage_margin() {
        assert!("wide".parse::<Margin>().is_err());
    }

    #[test]
    fn negative_margin_delays_entry() {
        let region = Region::new(2000.0, 500.0);
        let mut plain = InView::new(Margin::default(), 0.0, false);
        let mut inset = InView::new(Margin::Pixels(-100.0), 0.0, false);
        // Region top is 50px above the viewport bottom.
        assert!(plain.observe(region, at(1050.0)));
        assert!(!inset.observe(region, at(1050.0)));
        assert!(inset.observe(region, at(1150.0)));
    }

    #[test]
    fn threshold_requires_visible_fraction() {
        let region = Region::new(2000.0, 1000.0);
        let mut half = InView::new(Margin::default(), 0.5, false);
        assert!(!half.observe(region, at(1400.0)));
        assert!(half.observe(region, at(1500.0)));
    }

    #[test]
    fn once_latches() {
        let region = Region::new(2000.0, 500.0);
        let mut trigger = InView::once();
        assert!(!trigger.observe(region, at(0.0)));
        assert!(trigger.observe(region, at(1500.0)));
        assert!(trigger.observe(region, at(0.0)));
        trigger.rearm();
        assert!(!trigger.observe(region, at(0.0)));
    }

    #[test]
    fn repeatable_follows_viewport() {
        let region = Region::new(2000.0, 500.0);
        let mut trigger = InView::new(Margin::Percent(-20.0), 0.0, false);
        assert!(trigger.observe(region, at(1500.0)));
        assert!(!trigger.observe(region, at(5000.0)));
    }

    #[test]
    fn zero_height_region_uses_its_top() {
        let region = Region::new(2000.0, 0.0);
        assert_eq!(visible_fraction(region, at(1500.0), Margin::default()), 1.0);
        assert_eq!(visible_fraction(region, at(0.0), Margin::default()), 0.0);
    }
}
