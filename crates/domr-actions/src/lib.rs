#![forbid(unsafe_code)]

//! DOM actions for domr.
//!
//! An action type (`"text"`, `"class"`, ...) names a factory that turns a
//! property and its config record into an [`ActionTemplate`]: the task id
//! used for coalescing plus the executor that performs one DOM mutation.
//!
//! [`ActionRegistry::builtin`] carries the standard set; hosts register
//! their own types next to them.

pub mod builtin;
pub mod registry;

pub use builtin::{boolean_name, is_truthy};
pub use registry::{ActionFactory, ActionRegistry, ActionTemplate};
