#![forbid(unsafe_code)]

//! Manual frame clock.
//!
//! [`FrameClock`] stands in for `requestAnimationFrame`: callbacks armed with
//! [`TickSource::schedule_once`] wait until the test calls [`FrameClock::tick`].
//! Callbacks armed while a tick is running are due on the following tick, as
//! in a browser.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use domr_core::{TickCallback, TickSource};

thread_local! {
    static GLOBAL_CLOCK: FrameClock = FrameClock::new();
}

#[derive(Default)]
struct ClockInner {
    queue: RefCell<VecDeque<TickCallback>>,
    frames: Cell<u64>,
    unavailable: Cell<bool>,
}

/// Manually advanced frame clock. Clones share the same queue.
#[derive(Clone, Default)]
pub struct FrameClock {
    inner: Rc<ClockInner>,
}

impl FrameClock {
    /// Create an independent clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-thread clock used by [`Node`](crate::Node)'s frame source.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_CLOCK.with(Clone::clone)
    }

    /// Run every callback armed before this call. Returns how many ran.
    pub fn tick(&self) -> usize {
        let due: Vec<TickCallback> = self.inner.queue.borrow_mut().drain(..).collect();
        self.inner.frames.set(self.inner.frames.get() + 1);
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }

    /// Callbacks waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Simulate a host without this scheduling capability.
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.set(!available);
    }
}

impl TickSource for FrameClock {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        if self.inner.unavailable.get() {
            return Err(callback);
        }
        self.inner.queue.borrow_mut().push_back(callback);
        Ok(())
    }
}

impl fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameClock")
            .field("frame", &self.frame())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_wait_for_tick() {
        let clock = FrameClock::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        assert!(clock.schedule_once(Box::new(move || h.set(h.get() + 1))).is_ok());
        assert_eq!(hits.get(), 0);
        assert_eq!(clock.pending(), 1);
        assert_eq!(clock.tick(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn callbacks_armed_during_tick_run_next_frame() {
        let clock = FrameClock::new();
        let hits = Rc::new(Cell::new(0));
        let inner_clock = clock.clone();
        let h = Rc::clone(&hits);
        let _ = clock.schedule_once(Box::new(move || {
            let h2 = Rc::clone(&h);
            let _ = inner_clock.schedule_once(Box::new(move || h2.set(h2.get() + 1)));
        }));
        clock.tick();
        assert_eq!(hits.get(), 0);
        assert_eq!(clock.pending(), 1);
        clock.tick();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unavailable_clock_hands_callback_back() {
        let clock = FrameClock::new();
        clock.set_available(false);
        let rejected = clock.schedule_once(Box::new(|| {}));
        assert!(rejected.is_err());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn global_clock_is_shared_per_thread() {
        let a = FrameClock::global();
        let b = FrameClock::global();
        let _ = a.schedule_once(Box::new(|| {}));
        assert_eq!(b.pending(), a.pending());
        a.tick();
    }
}
