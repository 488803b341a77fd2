use super::ScrollMetrics;
use log::{debug, trace, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener = Box<dyn FnMut(&ScrollMetrics)>;

/// Re-dispatch rounds allowed when listeners keep moving the viewport.
const MAX_REDISPATCH: usize = 16;

#[derive(Default)]
struct HubInner {
    metrics: ScrollMetrics,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    registered: usize,
    dispatching: bool,
    pending: bool,
    removed: Vec<u64>,
}

impl HubInner {
    fn forget(&mut self, id: u64) {
        if self.dispatching {
            self.removed.push(id);
        } else {
            self.listeners.retain(|(listener, _)| *listener != id);
        }
        self.registered = self.registered.saturating_sub(1);
        debug!("scroll listener {id} detached");
    }
}

#[derive(Default)]
struct Shared {
    inner: RefCell<HubInner>,
    /// Guards dropped while `inner` was borrowed park their id here.
    orphaned: RefCell<Vec<u64>>,
}

impl Shared {
    fn reap(&self, inner: &mut HubInner) {
        for id in self.orphaned.take() {
            inner.forget(id);
        }
    }
}

/// Host-side source of scroll and resize notifications.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone, Default)]
pub struct ScrollHub {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for ScrollHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("ScrollHub")
            .field("metrics", &inner.metrics)
            .field("listeners", &inner.registered)
            .finish()
    }
}

impl ScrollHub {
    pub fn new(metrics: ScrollMetrics) -> Self {
        let shared = Shared {
            inner: RefCell::new(HubInner {
                metrics,
                ..Default::default()
            }),
            orphaned: RefCell::default(),
        };
        Self {
            shared: Rc::new(shared),
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.shared.inner.borrow().metrics
    }

    /// Listeners currently registered, including while a dispatch runs.
    pub fn listener_count(&self) -> usize {
        let mut inner = self.shared.inner.borrow_mut();
        self.shared.reap(&mut inner);
        inner.registered
    }

    /// Registers `listener` for every later scroll/resize. The listener is
    /// removed when the returned guard is dropped.
    #[must_use = "dropping the guard deregisters the listener immediately"]
    pub fn listen(&self, listener: impl FnMut(&ScrollMetrics) + 'static) -> ListenerGuard {
        let mut inner = self.shared.inner.borrow_mut();
        self.shared.reap(&mut inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.registered += 1;
        inner.listeners.push((id, Box::new(listener)));
        debug!("scroll listener {id} attached");
        ListenerGuard {
            hub: Rc::downgrade(&self.shared),
            id,
        }
    }

    /// Moves the viewport, clamped to the scrollable range.
    pub fn scroll_to(&self, scroll_y: f32) {
        {
            let mut inner = self.shared.inner.borrow_mut();
            let max = inner.metrics.max_scroll();
            inner.metrics.scroll_y = if scroll_y.is_finite() { scroll_y.clamp(0.0, max) } else { 0.0 };
        }
        self.publish();
    }

    pub fn scroll_by(&self, delta: f32) {
        let current = self.metrics().scroll_y;
        self.scroll_to(current + delta);
    }

    pub fn resize(&self, viewport_height: f32, document_height: f32) {
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.metrics.viewport_height = viewport_height.max(0.0);
            inner.metrics.document_height = document_height.max(0.0);
            let max = inner.metrics.max_scroll();
            inner.metrics.scroll_y = inner.metrics.scroll_y.min(max);
        }
        self.publish();
    }

    /// Delivers the current metrics to every listener. A listener that moves
    /// the viewport mid-dispatch schedules another round, so every listener
    /// ends up having seen the final metrics.
    fn publish(&self) {
        let mut listeners = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.dispatching {
                trace!("nested scroll publish deferred");
                inner.pending = true;
                return;
            }
            self.shared.reap(&mut inner);
            inner.dispatching = true;
            std::mem::take(&mut inner.listeners)
        };

        for round in 0.. {
            let metrics = {
                let mut inner = self.shared.inner.borrow_mut();
                inner.pending = false;
                inner.metrics
            };
            for (id, listener) in listeners.iter_mut() {
                if self.shared.inner.borrow().removed.contains(id) {
                    continue;
                }
                listener(&metrics);
            }

            let mut inner = self.shared.inner.borrow_mut();
            listeners.append(&mut inner.listeners);
            if !inner.pending {
                break;
            }
            if round + 1 >= MAX_REDISPATCH {
                warn!("scroll listeners kept moving the viewport, giving up after {MAX_REDISPATCH} rounds");
                inner.pending = false;
                break;
            }
        }

        let mut inner = self.shared.inner.borrow_mut();
        inner.dispatching = false;
        let removed = std::mem::take(&mut inner.removed);
        listeners.retain(|(id, _)| !removed.contains(id));
        inner.listeners = listeners;
        self.shared.reap(&mut inner);
    }
}

/// Keeps a scroll listener registered for as long as it lives.
#[derive(Debug)]
pub struct ListenerGuard {
    hub: Weak<Shared>,
    id: u64,
}

impl ListenerGuard {
    pub fn detach(self) {}
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(shared) = self.hub.upgrade() else {
            return;
        };
        match shared.inner.try_borrow_mut() {
            Ok(mut inner) => inner.forget(self.id),
            Err(_) => {
                trace!("scroll hub busy, deferring removal of listener {}", self.id);
                shared.orphaned.borrow_mut().push(self.id);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn hub() -> ScrollHub {
        ScrollHub::new(ScrollMetrics::new(800.0, 4000.0))
    }

    #[test]
    fn listeners_see_every_publish_until_dropped() {
        let hub = hub();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let guard = hub.listen(move |_| counter.set(counter.get() + 1));
        hub.scroll_to(100.0);
        hub.resize(900.0, 4000.0);
        assert_eq!(seen.get(), 2);

        drop(guard);
        assert_eq!(hub.listener_count(), 0);
        hub.scroll_to(200.0);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn scroll_is_clamped_to_document() {
        let hub = hub();
        hub.scroll_to(10_000.0);
        assert_eq!(hub.metrics().scroll_y, 3200.0);
        hub.scroll_by(-5000.0);
        assert_eq!(hub.metrics().scroll_y, 0.0);
        hub.scroll_to(f32::NAN);
        assert_eq!(hub.metrics().scroll_y, 0.0);
    }

    #[test]
    fn shrinking_document_pulls_scroll_back() {
        let hub = hub();
        hub.scroll_to(3000.0);
        hub.resize(800.0, 1000.0);
        assert_eq!(hub.metrics().scroll_y, 200.0);
    }

    #[test]
    fn guard_dropped_during_dispatch_is_removed_afterwards() {
        let hub = hub();
        let slot: Rc<RefCell<Option<ListenerGuard>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));

        let inner_slot = slot.clone();
        let inner_calls = calls.clone();
        let first = hub.listen(move |_| {
            inner_calls.set(inner_calls.get() + 1);
            inner_slot.borrow_mut().take();
        });
        let second_calls = calls.clone();
        *slot.borrow_mut() = Some(hub.listen(move |_| second_calls.set(second_calls.get() + 100)));

        hub.scroll_to(10.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(hub.listener_count(), 1);
        hub.scroll_to(20.0);
        assert_eq!(calls.get(), 2);
        drop(first);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn viewport_moved_by_a_listener_reaches_every_listener() {
        let hub = hub();
        let handle = hub.clone();
        let _snap = hub.listen(move |metrics| {
            if metrics.scroll_y < 500.0 {
                handle.scroll_to(1000.0);
            }
        });
        let seen: Rc<RefCell<Vec<f32>>> = Rc::default();
        let sink = seen.clone();
        let _record = hub.listen(move |metrics| sink.borrow_mut().push(metrics.scroll_y));

        hub.scroll_to(100.0);
        assert_eq!(hub.metrics().scroll_y, 1000.0);
        assert_eq!(*seen.borrow(), vec![100.0, 1000.0]);
    }

    #[test]
    fn endless_redispatch_is_capped() {
        let hub = hub();
        let handle = hub.clone();
        let rounds = Rc::new(Cell::new(0));
        let counter = rounds.clone();
        let _jitter = hub.listen(move |metrics| {
            counter.set(counter.get() + 1);
            handle.scroll_to(if metrics.scroll_y == 0.0 { 10.0 } else { 0.0 });
        });
        hub.scroll_to(0.0);
        assert_eq!(rounds.get(), MAX_REDISPATCH);
    }

    #[test]
    fn count_stays_accurate_during_dispatch() {
        let hub = hub();
        let handle = hub.clone();
        let during = Rc::new(Cell::new(0));
        let sink = during.clone();
        let _first = hub.listen(move |_| sink.set(handle.listener_count()));
        let _second = hub.listen(|_| {});
        hub.scroll_to(50.0);
        assert_eq!(during.get(), 2);
        assert_eq!(hub.listener_count(), 2);
    }

    #[test]
    fn guard_dropped_while_hub_is_borrowed_is_removed_later() {
        let hub = hub();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let guard = hub.listen(move |_| counter.set(counter.get() + 1));

        let busy = hub.shared.inner.borrow();
        drop(guard);
        drop(busy);

        assert_eq!(hub.listener_count(), 0);
        hub.scroll_to(100.0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn guards_outliving_the_hub_are_harmless() {
        let hub = hub();
        let guard = hub.listen(|_| {});
        drop(hub);
        drop(guard);
    }
}
