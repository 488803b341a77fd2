use super::easing::Easing;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterState {
    /// Trigger is false; the value rests at `start`.
    Idle,
    Running { started_at: f32 },
    /// Value pinned to `end`. `rearmed` becomes true once the trigger has
    /// dropped back to false, so the next rising edge restarts the run.
    Settled { rearmed: bool },
}

/// Drives a number from `start` to `end` over a fixed duration once its
/// trigger turns true.
#[derive(Debug, Clone)]
pub struct CounterAnimator {
    start: f64,
    end: f64,
    duration: f32,
    easing: Easing,
    steps: Option<u32>,
    decimals: u32,
    state: CounterState,
    trigger: bool,
    value: f64,
}

impl CounterAnimator {
    pub fn new(start: f64, end: f64, duration: f32) -> Self {
        Self {
            start,
            end,
            duration,
            easing: Easing::EaseOutCubic,
            steps: None,
            decimals: 0,
            state: CounterState::Idle,
            trigger: false,
            value: start,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Quantises progress into `steps` discrete frames instead of sampling
    /// it continuously.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = (steps > 0).then_some(steps);
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CounterState::Running { .. })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Value rounded to the configured number of decimals.
    pub fn display(&self) -> f64 {
        if self.value == self.end {
            return self.end;
        }
        let scale = 10f64.powi(self.decimals.min(15) as i32);
        (self.value * scale).round() / scale
    }

    pub fn formatted(&self) -> String {
        format!("{:.*}", self.decimals as usize, self.display())
    }

    /// Feeds the external trigger. A rising edge starts a run from `start`;
    /// a falling edge cancels a run in progress and re-arms a settled one.
    pub fn set_trigger(&mut self, trigger: bool, now: f32) {
        if trigger == self.trigger {
            return;
        }
        self.trigger = trigger;
        match (trigger, self.state) {
            (true, CounterState::Idle) | (true, CounterState::Settled { rearmed: true }) => {
                debug!("counter {} -> {} started at {now:.3}", self.start, self.end);
                self.state = CounterState::Running { started_at: now };
                self.value = self.start;
            }
            (false, CounterState::Running { .. }) => {
                debug!("counter cancelled before settling");
                self.state = CounterState::Idle;
                self.value = self.start;
            }
            (false, CounterState::Settled { .. }) => {
                self.state = CounterState::Settled { rearmed: true };
            }
            _ => {}
        }
    }

    /// Advances to `now` and returns the current value. Idle and settled
    /// counters ignore ticks.
    pub fn tick(&mut self, now: f32) -> f64 {
        let CounterState::Running { started_at } = self.state else {
            return self.value;
        };
        let progress = if self.duration > 0.0 {
            ((now - started_at) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            self.value = self.end;
            self.state = CounterState::Settled { rearmed: false };
            debug!("counter settled on {}", self.end);
            return self.value;
        }
        let progress = match self.steps {
            Some(steps) => (progress * steps as f32).floor() / steps as f32,
            None => progress,
        };
        let eased = f64::from(self.easing.apply(progress));
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        self.value = (self.start + (self.end - self.start) * eased).clamp(lo, hi);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn trajectory(counter: &mut CounterAnimator, from: f32, ticks: usize) -> Vec<f64> {
        (0..=ticks).map(|i| counter.tick(from + i as f32 * DT)).collect()
    }

    #[test]
    fn counts_from_start_to_exact_end() {
        let mut counter = CounterAnimator::new(0.0, 100.0, 2.0);
        counter.set_trigger(true, 0.0);
        assert_eq!(counter.tick(0.0), 0.0);
        let values = trajectory(&mut counter, 0.0, 150);
        assert!(values.windows(2).all(|w| w[1] >= w[0]), "counter went backwards");
        assert_eq!(counter.tick(2.0), 100.0);
        assert_eq!(counter.tick(50.0), 100.0);
        assert_eq!(counter.display(), 100.0);
        assert_eq!(counter.state(), CounterState::Settled { rearmed: false });
    }

    #[test]
    fn idle_until_triggered() {
        let mut counter = CounterAnimator::new(5.0, 10.0, 1.0);
        assert_eq!(counter.tick(3.0), 5.0);
        assert_eq!(counter.state(), CounterState::Idle);
    }

    #[test]
    fn settled_ignores_ticks_until_rearmed() {
        let mut counter = CounterAnimator::new(0.0, 100.0, 2.0);
        counter.set_trigger(true, 0.0);
        counter.tick(2.5);
        counter.set_trigger(true, 3.0);
        assert_eq!(counter.tick(3.1), 100.0);
        assert_eq!(counter.state(), CounterState::Settled { rearmed: false });
    }

    #[test]
    fn retrigger_reproduces_trajectory() {
        let mut counter = CounterAnimator::new(0.0, 100.0, 2.0);
        counter.set_trigger(true, 0.0);
        let first = trajectory(&mut counter, 0.0, 130);
        assert_eq!(counter.value(), 100.0);

        counter.set_trigger(false, 10.0);
        assert_eq!(counter.value(), 100.0);
        counter.set_trigger(true, 10.0);
        assert_eq!(counter.value(), 0.0);
        let second = trajectory(&mut counter, 10.0, 130);
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1e-3, "{a} != {b}");
        }
        assert_eq!(second.last(), Some(&100.0));
    }

    #[test]
    fn falling_edge_cancels_run() {
        let mut counter = CounterAnimator::new(0.0, 100.0, 2.0);
        counter.set_trigger(true, 0.0);
        counter.tick(1.0);
        counter.set_trigger(false, 1.0);
        assert_eq!(counter.state(), CounterState::Idle);
        assert_eq!(counter.tick(5.0), 0.0);
    }

    #[test]
    fn zero_duration_settles_on_first_tick() {
        let mut counter = CounterAnimator::new(0.0, 42.0, 0.0);
        counter.set_trigger(true, 1.0);
        assert_eq!(counter.tick(1.0), 42.0);
    }

    #[test]
    fn counts_down() {
        let mut counter = CounterAnimator::new(10.0, 0.0, 1.0).with_easing(Easing::Linear);
        counter.set_trigger(true, 0.0);
        assert_eq!(counter.tick(0.5), 5.0);
        assert_eq!(counter.tick(1.0), 0.0);
    }

    #[test]
    fn steps_quantise_progress() {
        let mut counter = CounterAnimator::new(0.0, 100.0, 1.0)
            .with_easing(Easing::Linear)
            .with_steps(4);
        counter.set_trigger(true, 0.0);
        assert_eq!(counter.tick(0.3), 25.0);
        assert_eq!(counter.tick(0.49), 25.0);
    }

    #[test]
    fn decimals_round_the_display() {
        let mut counter = CounterAnimator::new(0.0, 9.5, 1.0)
            .with_easing(Easing::Linear)
            .with_decimals(1);
        counter.set_trigger(true, 0.0);
        counter.tick(1.0 / 3.0);
        assert_eq!(counter.formatted(), "3.2");
        counter.tick(1.0);
        assert_eq!(counter.formatted(), "9.5");
    }
}
