#![forbid(unsafe_code)]

//! Coalescing, frame-scheduled task queue.
//!
//! A [`Batcher`] collects [`Task`]s and runs them together on the next
//! frame. It bounds DOM writes to at most one per `(element, id)` per frame
//! regardless of how often callers push.
//!
//! # Invariants
//!
//! 1. At most one pending task per `(element, id)`. A push whose identity
//!    matches a pending task replaces it in place: same slot, newest payload.
//! 2. Execution follows queue order.
//! 3. At most one tick callback is live at a time; pushes within the same
//!    tick share it. A callback armed before a `flush` or `reset` is
//!    superseded and does nothing when it fires.
//! 4. `flush` runs the tasks queued when it started, then removes them. A
//!    second `flush` with nothing queued does nothing.
//! 5. `cancel(group)` only clears pending flags; cancelled entries are swept
//!    by the next `flush`.
//!
//! # Reentrancy
//!
//! Executors may push, cancel, reset, or flush while a pass is running; the
//! queue borrow is never held across an executor call.
//!
//! - The pass length is fixed when `flush` starts. Tasks pushed during the
//!   pass are deferred to the next cycle and arm the next tick.
//! - A push matching a task the pass has not reached yet cancels that task
//!   and is deferred, so the newest payload still wins exactly once.
//! - `cancel` during a pass affects tasks the pass has not reached yet.
//! - `reset` during a pass stops it after the current executor.
//! - A nested `flush` is a no-op.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Tick source rejects the callback | `warn!` once per outage, queue waits for an explicit `flush` or the next push |
//! | All `Batcher` handles dropped with a tick armed | the tick callback finds nothing and returns |
//! | Executor panics | panic propagates; the panicking task is dropped, tasks the pass had not reached stay queued and a tick is armed for them |

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use domr_core::{Element, GroupId, Task, TickCallback, TickSource};
use tracing::{debug, trace, warn};
use web_time::Instant;

thread_local! {
    static SHARED_BATCHERS: RefCell<AHashMap<TypeId, Box<dyn Any>>> = RefCell::new(AHashMap::new());
}

/// Outcome of one [`Batcher::flush`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Tasks whose executor ran.
    pub executed: usize,
    /// Tasks skipped because they were cancelled or superseded.
    pub skipped: usize,
    /// Tasks left queued for the next cycle (pushed during the pass).
    pub deferred: usize,
}

struct BatcherInner<E> {
    /// `None` marks a slot the running pass has already taken.
    queue: RefCell<Vec<Option<Task<E>>>>,
    armed: Cell<bool>,
    /// Bumped on every arm; only the callback carrying the latest value flushes.
    arm_seq: Cell<u64>,
    /// Length of the running pass, if any.
    pass_len: Cell<Option<usize>>,
    /// Bumped by `reset` so a running pass can tell its slots are gone.
    epoch: Cell<u64>,
    /// Set after the tick source rejects a callback, to warn once per outage.
    tick_refused: Cell<bool>,
    ticker: Rc<dyn TickSource>,
}

/// Handle to a coalescing task queue. Clones share the same queue.
pub struct Batcher<E> {
    inner: Rc<BatcherInner<E>>,
}

impl<E> Clone for Batcher<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Element> Batcher<E> {
    /// The per-thread default batcher for this element type, driven by
    /// [`Element::frame_source`].
    #[must_use]
    pub fn shared() -> Self {
        SHARED_BATCHERS.with(|map| {
            let mut map = map.borrow_mut();
            let entry = map
                .entry(TypeId::of::<E>())
                .or_insert_with(|| Box::new(Self::new(E::frame_source())));
            let any: &dyn Any = &**entry;
            any.downcast_ref::<Self>()
                .cloned()
                .unwrap_or_else(|| Self::new(E::frame_source()))
        })
    }
}

impl<E: PartialEq + 'static> Batcher<E> {
    /// Create an independent batcher that arms flushes on `ticker`.
    #[must_use]
    pub fn new(ticker: Rc<dyn TickSource>) -> Self {
        Self {
            inner: Rc::new(BatcherInner {
                queue: RefCell::new(Vec::new()),
                armed: Cell::new(false),
                arm_seq: Cell::new(0),
                pass_len: Cell::new(None),
                epoch: Cell::new(0),
                tick_refused: Cell::new(false),
                ticker,
            }),
        }
    }

    /// Queue a task, coalescing with a pending task of the same identity,
    /// and arm a flush if none is armed.
    pub fn push(&self, task: Task<E>) {
        self.enqueue(task, false);
    }

    /// Queue a task at the end of the queue, cancelling any pending task of
    /// the same identity instead of taking its slot.
    ///
    /// Use this for work that must run after everything queued before it.
    pub fn push_last(&self, task: Task<E>) {
        self.enqueue(task, true);
    }

    fn enqueue(&self, mut task: Task<E>, append: bool) {
        task.mark_pending();
        {
            let mut queue = self.inner.queue.borrow_mut();
            let slot = queue
                .iter()
                .position(|q| q.as_ref().is_some_and(|q| q.is_pending() && q.same_identity(&task)));
            match (slot, self.inner.pass_len.get()) {
                (Some(index), pass_len) if append || pass_len.is_some_and(|len| index < len) => {
                    trace!(id = %task.id, slot = index, "superseding task");
                    if let Some(old) = queue[index].as_mut() {
                        old.settle();
                    }
                    queue.push(Some(task));
                }
                (Some(index), _) => {
                    trace!(id = %task.id, slot = index, "coalesced task");
                    queue[index] = Some(task);
                }
                (None, _) => queue.push(Some(task)),
            }
        }
        if !self.inner.armed.get() {
            self.arm();
        }
    }

    /// Run every pending task in queue order, then clear the queue.
    pub fn flush(&self) -> FlushReport {
        let inner = &self.inner;
        let mut report = FlushReport::default();
        if inner.pass_len.get().is_some() {
            trace!("nested flush ignored");
            return report;
        }
        inner.armed.set(false);
        let pass_len = inner.queue.borrow().len();
        if pass_len == 0 {
            return report;
        }

        let started = Instant::now();
        let mut pass = Pass::open(self, pass_len);
        for index in 0..pass_len {
            if inner.epoch.get() != pass.epoch {
                break;
            }
            let taken = {
                let mut queue = inner.queue.borrow_mut();
                match queue.get_mut(index) {
                    Some(slot) => slot.take(),
                    None => break,
                }
            };
            pass.visited = index + 1;
            let Some(mut task) = taken else { continue };
            if !task.is_pending() {
                report.skipped += 1;
                continue;
            }
            trace!(id = %task.id, property = task.property(), "running task");
            task.run();
            task.settle();
            report.executed += 1;
        }
        drop(pass);

        report.deferred = self.len();
        debug!(
            executed = report.executed,
            skipped = report.skipped,
            deferred = report.deferred,
            elapsed_us = started.elapsed().as_micros() as u64,
            "flushed"
        );
        report
    }

    /// Drop every queued task without running it and disarm.
    pub fn reset(&self) {
        let dropped = std::mem::take(&mut *self.inner.queue.borrow_mut());
        self.inner.epoch.set(self.inner.epoch.get() + 1);
        self.inner.armed.set(false);
        debug!(dropped = dropped.iter().flatten().count(), "batcher reset");
    }

    /// Clear the pending flag of every queued task in `group`.
    ///
    /// Returns how many pending tasks were cancelled.
    pub fn cancel(&self, group: GroupId) -> usize {
        let mut cancelled = 0;
        for task in self.inner.queue.borrow_mut().iter_mut().flatten() {
            if task.group == Some(group) && task.is_pending() {
                task.settle();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(group = group.id(), cancelled, "cancelled group");
        }
        cancelled
    }

    /// Queued entries, including cancelled ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.borrow().iter().flatten().count()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queued entries that will run on the next flush.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .queue
            .borrow()
            .iter()
            .flatten()
            .filter(|t| t.is_pending())
            .count()
    }

    /// Whether a tick callback is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.armed.get()
    }

    /// Whether both handles share the same queue.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn arm(&self) {
        // Set first: a source that runs the callback synchronously must see
        // the flag it is about to clear.
        self.inner.armed.set(true);
        let seq = self.inner.arm_seq.get() + 1;
        self.inner.arm_seq.set(seq);
        let weak = Rc::downgrade(&self.inner);
        let callback: TickCallback = Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            if !inner.armed.get() || inner.arm_seq.get() != seq {
                trace!("superseded tick ignored");
                return;
            }
            inner.armed.set(false);
            Batcher { inner }.flush();
        });
        if self.inner.ticker.schedule_once(callback).is_err() {
            self.inner.armed.set(false);
            if self.inner.tick_refused.replace(true) {
                trace!("tick source still unavailable");
            } else {
                warn!("no tick source available; queued tasks wait for an explicit flush");
            }
        } else {
            self.inner.tick_refused.set(false);
            trace!("flush armed");
        }
    }
}

impl<E> fmt::Debug for Batcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.inner.queue.borrow();
        f.debug_struct("Batcher")
            .field("queued", &queue.iter().flatten().count())
            .field("armed", &self.inner.armed.get())
            .field("in_pass", &self.inner.pass_len.get().is_some())
            .finish()
    }
}

/// Closes a flush pass, also on unwind.
struct Pass<'a, E: PartialEq + 'static> {
    batcher: &'a Batcher<E>,
    /// Slots taken so far; only these are swept.
    visited: usize,
    epoch: u64,
}

impl<'a, E: PartialEq + 'static> Pass<'a, E> {
    fn open(batcher: &'a Batcher<E>, len: usize) -> Self {
        batcher.inner.pass_len.set(Some(len));
        Self {
            batcher,
            visited: 0,
            epoch: batcher.inner.epoch.get(),
        }
    }
}

impl<E: PartialEq + 'static> Drop for Pass<'_, E> {
    fn drop(&mut self) {
        let inner = &self.batcher.inner;
        inner.pass_len.set(None);
        let swept: Vec<Option<Task<E>>> = if inner.epoch.get() == self.epoch {
            let mut queue = inner.queue.borrow_mut();
            let end = self.visited.min(queue.len());
            queue.drain(..end).collect()
        } else {
            Vec::new()
        };
        drop(swept);
        if !inner.armed.get() && !self.batcher.is_empty() {
            self.batcher.arm();
        }
    }
}
