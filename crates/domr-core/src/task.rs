#![forbid(unsafe_code)]

//! Deferred DOM-mutation units.
//!
//! A [`Task`] is identified by `(element, id)`. The scheduler keeps at most
//! one pending task per identity; pushing another one with the same identity
//! replaces the earlier payload. Tasks optionally belong to a [`GroupId`] so
//! an owner can cancel all of its pending work at once.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ActionConfig;
use crate::value::DisplayValue;

/// String half of a task's identity (e.g. `"text"`, `"attr-src"`).
pub type TaskId = Cow<'static, str>;

/// Shared executor invoked with the task being run.
pub type Executor<E> = Rc<dyn Fn(&Task<E>)>;

/// Global counter for unique group ids.
static GROUP_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Owner tag used for bulk cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    /// Allocate a new unique group id.
    #[must_use]
    pub fn next() -> Self {
        Self(GROUP_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Data carried to the executor.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    /// Property path that produced the task, if any.
    pub property: Option<String>,
    /// New display value.
    pub value: DisplayValue,
    /// Previously rendered display value; `None` on first render.
    pub old_value: Option<DisplayValue>,
    /// The config record the task was built from.
    pub config: Option<Rc<ActionConfig>>,
}

/// A deferred unit of work with a coalescing identity.
pub struct Task<E> {
    /// Target element; first half of the identity.
    pub element: E,
    /// Second half of the identity.
    pub id: TaskId,
    /// Owner used by `cancel(group)`.
    pub group: Option<GroupId>,
    /// Invoked with `&self` at flush.
    pub execute: Executor<E>,
    /// Values handed to the executor.
    pub payload: Payload,
    pending: bool,
}

impl<E> Task<E> {
    /// Create a task from a closure. The task starts out not pending; the
    /// scheduler marks it pending on push.
    pub fn new(element: E, id: impl Into<TaskId>, execute: impl Fn(&Task<E>) + 'static) -> Self {
        Self::from_executor(element, id, Rc::new(execute))
    }

    /// Create a task from a shared executor.
    pub fn from_executor(element: E, id: impl Into<TaskId>, execute: Executor<E>) -> Self {
        Self {
            element,
            id: id.into(),
            group: None,
            execute,
            payload: Payload::default(),
            pending: false,
        }
    }

    /// Set the owning group.
    #[must_use]
    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Whether the task still has to run.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark the task as waiting for execution.
    #[inline]
    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Mark the task as done or cancelled.
    #[inline]
    pub fn settle(&mut self) {
        self.pending = false;
    }

    /// Invoke the executor with this task.
    pub fn run(&self) {
        (self.execute)(self);
    }

    /// New display value.
    #[must_use]
    pub fn value(&self) -> &DisplayValue {
        &self.payload.value
    }

    /// Previously rendered display value.
    #[must_use]
    pub fn old_value(&self) -> Option<&DisplayValue> {
        self.payload.old_value.as_ref()
    }

    /// Config record, or an empty one for tasks built without config.
    #[must_use]
    pub fn config(&self) -> &ActionConfig {
        self.payload
            .config
            .as_deref()
            .unwrap_or(ActionConfig::empty())
    }

    /// Property path, or `""`.
    #[must_use]
    pub fn property(&self) -> &str {
        self.payload.property.as_deref().unwrap_or("")
    }
}

impl<E: PartialEq> Task<E> {
    /// Whether `other` has the same `(element, id)` identity.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id && self.element == other.element
    }
}

impl<E: fmt::Debug> fmt::Debug for Task<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("element", &self.element)
            .field("id", &self.id)
            .field("group", &self.group)
            .field("payload", &self.payload)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
