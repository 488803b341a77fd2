//! Single-threaded frame host on top of a `calloop` event loop.
//!
//! Every animation that needs ticks registers its own frame callback through
//! [`FrameHandle::on_frame`]. The callback re-arms its timer after each tick,
//! so control returns to the event loop between frames. The returned
//! [`FrameGuard`] removes the timer when dropped; a callback that wants to
//! end on its own returns [`FrameAction::Stop`] instead of dropping its
//! guard from inside the callback.

use anyhow::Result;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, LoopSignal, RegistrationToken};
use log::{debug, trace};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Continue,
    Stop,
}

/// Seconds elapsed since the loop was created.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    epoch: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }

    pub fn now(&self) -> f32 {
        self.epoch.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn frame_interval(fps_cap: u32) -> Duration {
    Duration::from_secs(1) / fps_cap.clamp(1, 1000)
}

pub struct FrameLoop {
    event_loop: EventLoop<'static, ()>,
    clock: FrameClock,
    interval: Duration,
}

impl FrameLoop {
    pub fn new(fps_cap: u32) -> Result<Self> {
        let interval = frame_interval(fps_cap);
        debug!("frame loop at {fps_cap} fps ({interval:?} per frame)");
        Ok(Self {
            event_loop: EventLoop::try_new()?,
            clock: FrameClock::new(),
            interval,
        })
    }

    pub fn handle(&self) -> FrameHandle {
        FrameHandle {
            handle: self.event_loop.handle(),
            clock: self.clock,
            interval: self.interval,
        }
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn signal(&self) -> LoopSignal {
        self.event_loop.get_signal()
    }

    /// Waits up to `timeout` for due timers and runs their callbacks.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.event_loop.dispatch(timeout, &mut ())?;
        Ok(())
    }

    /// Dispatches frames until `span` has elapsed.
    pub fn run_for(&mut self, span: Duration) -> Result<()> {
        let deadline = Instant::now() + span;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            self.dispatch(Some((deadline - now).min(self.interval)))?;
        }
    }
}

#[derive(Clone)]
pub struct FrameHandle {
    handle: LoopHandle<'static, ()>,
    clock: FrameClock,
    interval: Duration,
}

impl std::fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHandle")
            .field("clock", &self.clock)
            .field("interval", &self.interval)
            .finish()
    }
}

impl FrameHandle {
    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    /// Calls `callback` with the frame time once per frame until it returns
    /// [`FrameAction::Stop`] or the guard is dropped.
    #[must_use = "dropping the guard cancels the frame callback"]
    pub fn on_frame<F>(&self, mut callback: F) -> Result<FrameGuard>
    where
        F: FnMut(f32) -> FrameAction + 'static,
    {
        let live = Rc::new(Cell::new(true));
        let flag = live.clone();
        let clock = self.clock;
        let interval = self.interval;
        let token = self
            .handle
            .insert_source(Timer::from_duration(interval), move |_, _, _| {
                match callback(clock.now()) {
                    FrameAction::Continue => TimeoutAction::ToDuration(interval),
                    FrameAction::Stop => {
                        trace!("frame callback finished");
                        flag.set(false);
                        TimeoutAction::Drop
                    }
                }
            })
            .map_err(|err| err.error)?;
        Ok(FrameGuard {
            handle: self.handle.clone(),
            token: Some(token),
            live,
        })
    }
}

/// Scoped registration of a frame callback.
pub struct FrameGuard {
    handle: LoopHandle<'static, ()>,
    token: Option<RegistrationToken>,
    live: Rc<Cell<bool>>,
}

impl FrameGuard {
    /// True until the callback stopped itself or the guard was cancelled.
    pub fn is_active(&self) -> bool {
        self.live.get()
    }

    pub fn cancel(self) {}
}

impl std::fmt::Debug for FrameGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        if self.live.replace(false) {
            self.handle.remove(token);
            debug!("frame callback cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump_until(frames: &mut FrameLoop, mut done: impl FnMut() -> bool) {
        for _ in 0..500 {
            if done() {
                return;
            }
            frames.dispatch(Some(Duration::from_millis(5))).unwrap();
        }
        panic!("condition never met");
    }

    #[test]
    fn frame_interval_respects_cap() {
        assert_eq!(frame_interval(50), Duration::from_millis(20));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn callbacks_tick_until_guard_dropped() {
        let mut frames = FrameLoop::new(500).unwrap();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let guard = frames
            .handle()
            .on_frame(move |_| {
                counter.set(counter.get() + 1);
                FrameAction::Continue
            })
            .unwrap();

        pump_until(&mut frames, || ticks.get() >= 3);
        assert!(guard.is_active());
        drop(guard);

        let seen = ticks.get();
        frames.run_for(Duration::from_millis(30)).unwrap();
        assert_eq!(ticks.get(), seen, "tick fired after teardown");
    }

    #[test]
    fn stopping_callback_goes_inactive() {
        let mut frames = FrameLoop::new(500).unwrap();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let guard = frames
            .handle()
            .on_frame(move |_| {
                counter.set(counter.get() + 1);
                if counter.get() == 2 {
                    FrameAction::Stop
                } else {
                    FrameAction::Continue
                }
            })
            .unwrap();

        pump_until(&mut frames, || !guard.is_active());
        frames.run_for(Duration::from_millis(30)).unwrap();
        assert_eq!(ticks.get(), 2);
        drop(guard);
    }

    #[test]
    fn independent_callbacks_do_not_interfere() {
        let mut frames = FrameLoop::new(500).unwrap();
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let (ca, cb) = (a.clone(), b.clone());
        let guard_a = frames
            .handle()
            .on_frame(move |_| {
                ca.set(ca.get() + 1);
                FrameAction::Continue
            })
            .unwrap();
        let _guard_b = frames
            .handle()
            .on_frame(move |_| {
                cb.set(cb.get() + 1);
                FrameAction::Continue
            })
            .unwrap();

        pump_until(&mut frames, || a.get() > 0 && b.get() > 0);
        guard_a.cancel();
        let frozen = a.get();
        let before = b.get();
        pump_until(&mut frames, || b.get() > before + 2);
        assert_eq!(a.get(), frozen);
    }

    #[test]
    fn frame_time_advances() {
        let mut frames = FrameLoop::new(500).unwrap();
        let times = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = times.clone();
        let _guard = frames
            .handle()
            .on_frame(move |now| {
                sink.borrow_mut().push(now);
                FrameAction::Continue
            })
            .unwrap();
        pump_until(&mut frames, || times.borrow().len() >= 3);
        let times = times.borrow();
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
    }
}
