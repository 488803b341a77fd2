use super::easing::Easing;

/// Time-driven progress source. Times are seconds on the host's frame clock.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f32,
    pub duration: f32,
    pub current_time: f32,
    pub delay: f32,
    pub easing: Easing,
    started: bool,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
            delay: 0.0,
            easing: Easing::EaseInOut,
            started: false,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
        self.started = true;
    }

    /// Back to the not-started state; progress reads 0 until the next start.
    pub fn reset(&mut self) {
        self.started = false;
        self.start_time = 0.0;
        self.current_time = 0.0;
    }

    pub fn update(&mut self, now: f32) {
        self.current_time = now;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn elapsed(&self) -> f32 {
        if !self.started {
            return 0.0;
        }
        (self.current_time - self.start_time - self.delay).max(0.0)
    }

    /// Linear progress: exactly 0 before start, exactly 1 once complete.
    pub fn progress(&self) -> f32 {
        if !self.started || self.current_time < self.start_time + self.delay {
            return 0.0;
        }
        if self.duration.is_nan() || self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed() / self.duration).min(1.0).max(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        self.easing.apply(self.progress())
    }
}
