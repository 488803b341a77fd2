use super::easing::Easing;
use super::lerp::{Lerp, Offset};
use super::timeline::Timeline;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub delay: f32,
    pub duration: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl Transition {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            delay: 0.0,
            duration,
            easing,
        }
    }

    /// Delays item `index` of a list by `index * step` seconds.
    pub fn stagger(self, index: usize, step: f32) -> Self {
        Self {
            delay: self.delay + index as f32 * step,
            ..self
        }
    }

    pub fn timeline(&self) -> Timeline {
        Timeline::new(self.duration)
            .with_delay(self.delay)
            .with_easing(self.easing)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(0.5, Easing::EaseOut)
    }
}

/// Time-driven interpolation between two values.
#[derive(Debug, Clone)]
pub struct Tween<V> {
    pub from: V,
    pub to: V,
    timeline: Timeline,
}

impl<V: Lerp> Tween<V> {
    pub fn new(from: V, to: V, transition: Transition) -> Self {
        Self {
            from,
            to,
            timeline: transition.timeline(),
        }
    }

    pub fn start(&mut self, now: f32) {
        self.timeline.start(now);
    }

    pub fn reset(&mut self) {
        self.timeline.reset();
    }

    pub fn is_started(&self) -> bool {
        self.timeline.is_started()
    }

    pub fn is_complete(&self) -> bool {
        self.timeline.is_complete()
    }

    pub fn sample(&mut self, now: f32) -> V {
        self.timeline.update(now);
        if self.timeline.is_complete() {
            return self.to.clone();
        }
        self.from.lerp(&self.to, self.timeline.eased_progress())
    }
}

/// Opacity and vertical offset of an element revealed by [`fade_in_up`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FadeState {
    pub opacity: f32,
    pub offset: Offset,
}

impl Lerp for FadeState {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: self.opacity.lerp(&other.opacity, t),
            offset: self.offset.lerp(&other.offset, t),
        }
    }
}

/// Fades in while rising 20px into place over half a second.
pub fn fade_in_up() -> Tween<FadeState> {
    fade_in_up_with(Transition::default())
}

/// [`fade_in_up`] with custom timing.
pub fn fade_in_up_with(transition: Transition) -> Tween<FadeState> {
    Tween::new(
        FadeState {
            opacity: 0.0,
            offset: Offset::new(0.0, 20.0),
        },
        FadeState {
            opacity: 1.0,
            offset: Offset::ZERO,
        },
        transition,
    )
}
