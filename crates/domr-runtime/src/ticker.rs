#![forbid(unsafe_code)]

//! Tick source combinators.

use domr_core::{TickCallback, TickSource};
use tracing::debug;

/// Prefer a frame-bound source; fall back to a deferred one.
///
/// Mirrors `requestAnimationFrame || setTimeout`: the fallback is only
/// consulted when the primary hands the callback back.
#[derive(Debug, Clone, Default)]
pub struct FallbackTicker<F, D> {
    primary: F,
    fallback: D,
}

impl<F: TickSource, D: TickSource> FallbackTicker<F, D> {
    /// Combine a frame-bound source with a deferred fallback.
    #[must_use]
    pub fn new(primary: F, fallback: D) -> Self {
        Self { primary, fallback }
    }

    /// The frame-bound source.
    #[must_use]
    pub fn primary(&self) -> &F {
        &self.primary
    }

    /// The deferred source.
    #[must_use]
    pub fn fallback(&self) -> &D {
        &self.fallback
    }
}

impl<F: TickSource, D: TickSource> TickSource for FallbackTicker<F, D> {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        match self.primary.schedule_once(callback) {
            Ok(()) => Ok(()),
            Err(callback) => {
                debug!("frame tick unavailable, using deferred tick");
                self.fallback.schedule_once(callback)
            }
        }
    }
}

/// A source that never schedules.
///
/// Useful for hosts that drive `Batcher::flush` themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTicker;

impl TickSource for UnavailableTicker {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        Err(callback)
    }
}
