#![forbid(unsafe_code)]

//! Core types for domr: host capabilities, tasks, display values, and
//! binding configuration.
//!
//! Everything here is shared between the scheduler (`domr-runtime`), the
//! action executors (`domr-actions`) and the diff engine (`domr-binding`).
//! None of it performs DOM work on its own; the host supplies that through
//! [`Element`] and [`TickSource`].

pub mod config;
pub mod error;
pub mod host;
pub mod task;
pub mod value;

pub use config::{ActionConfig, BindingConfig, BindingEntry, DEFAULT_ACTION, ROOT_SELECTOR};
pub use error::BindError;
pub use host::{Element, TickCallback, TickSource};
pub use task::{Executor, GroupId, Payload, Task, TaskId};
pub use value::{DisplayValue, lookup_path};
