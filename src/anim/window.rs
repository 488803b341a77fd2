//! Piecewise-linear mapping of progress through breakpoint windows.

use super::lerp::Lerp;
use log::warn;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("breakpoint table needs at least 2 entries, got {0}")]
    TooShort(usize),

    #[error("breakpoint {index} has a non-finite threshold ({threshold})")]
    NonFiniteThreshold { index: usize, threshold: f32 },
}

/// Ordered `(threshold, value)` pairs over the `[0, 1]` progress domain.
///
/// Thresholds are non-decreasing once built. Equal thresholds are allowed and
/// model an instantaneous jump: the later-declared entry wins from that
/// threshold onward.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable<V> {
    points: Vec<(f32, V)>,
}

impl<V: Lerp> BreakpointTable<V> {
    /// Builds a table, clamping thresholds into `[0, 1]` and stable-sorting
    /// them when they were declared out of order.
    pub fn new(points: impl IntoIterator<Item = (f32, V)>) -> Result<Self, TableError> {
        let mut points: Vec<(f32, V)> = points.into_iter().collect();
        if points.len() < 2 {
            return Err(TableError::TooShort(points.len()));
        }
        for (index, (threshold, _)) in points.iter_mut().enumerate() {
            if !threshold.is_finite() {
                return Err(TableError::NonFiniteThreshold { index, threshold: *threshold });
            }
            *threshold = threshold.clamp(0.0, 1.0);
        }
        if points.windows(2).any(|w| w[0].0 > w[1].0) {
            warn!("breakpoint thresholds declared out of order, sorting");
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        Ok(Self { points })
    }

    /// Evenly spaced table: `values[i]` sits at `i / (n - 1)`.
    pub fn evenly(values: impl IntoIterator<Item = V>) -> Result<Self, TableError> {
        let values: Vec<V> = values.into_iter().collect();
        let last = values.len().saturating_sub(1).max(1) as f32;
        Self::new(values.into_iter().enumerate().map(|(i, v)| (i as f32 / last, v)))
    }

    pub fn points(&self) -> &[(f32, V)] {
        &self.points
    }

    pub fn first(&self) -> &V {
        &self.points[0].1
    }

    pub fn last(&self) -> &V {
        &self.points[self.points.len() - 1].1
    }

    /// Interpolated value at `progress`. Never extrapolates past the edge
    /// values and never fails.
    pub fn sample(&self, progress: f32) -> V {
        if progress.is_nan() {
            return self.first().clone();
        }
        // First entry whose threshold is strictly past `progress`; the entry
        // before it is the last one declared at or below `progress`.
        let upper = self.points.partition_point(|(t, _)| *t <= progress);
        if upper == 0 {
            return self.first().clone();
        }
        if upper == self.points.len() {
            return self.last().clone();
        }
        let (t0, v0) = &self.points[upper - 1];
        let (t1, v1) = &self.points[upper];
        let span = t1 - t0;
        if span <= 0.0 {
            return v0.clone();
        }
        v0.lerp(v1, (progress - t0) / span)
    }
}

/// Table for item `index` of `count` whose window is `[index/count,
/// (index+1)/count]`, ramping from `rest` to `active` over `lead` before
/// the window opens and back to `rest` over `lead` before it closes.
pub fn stagger_window<V: Lerp>(
    index: usize,
    count: usize,
    lead: f32,
    rest: V,
    active: V,
) -> Result<BreakpointTable<V>, TableError> {
    let count = count.max(1) as f32;
    let start = index as f32 / count;
    let end = (index + 1) as f32 / count;
    BreakpointTable::new([
        (start - lead, rest.clone()),
        (start, active.clone()),
        (end - lead, active),
        (end, rest),
    ])
}
