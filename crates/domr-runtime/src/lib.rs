#![forbid(unsafe_code)]

//! Frame-synced task scheduling for domr.
//!
//! - [`Batcher`]: the coalescing queue. Pushing arms one flush on the next
//!   frame; same-identity pushes replace each other in place; owners cancel
//!   their pending work by group.
//! - [`FallbackTicker`]: tries a frame-bound tick source, then a generic
//!   deferred one.
//! - [`UnavailableTicker`]: a source that never schedules (headless hosts
//!   that flush explicitly).

pub mod batcher;
pub mod ticker;

pub use batcher::{Batcher, FlushReport};
pub use ticker::{FallbackTicker, UnavailableTicker};
