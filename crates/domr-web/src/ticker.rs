#![forbid(unsafe_code)]

//! Browser tick sources.

use std::cell::RefCell;
use std::rc::Rc;

use domr_core::{TickCallback, TickSource};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

/// Runs the callback on the next `requestAnimationFrame`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RafTicker;

impl TickSource for RafTicker {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        schedule(callback, "requestAnimationFrame", |window, f| {
            window.request_animation_frame(f)
        })
    }
}

/// Runs the callback from `setTimeout(.., 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutTicker;

impl TickSource for TimeoutTicker {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        schedule(callback, "setTimeout", |window, f| {
            window.set_timeout_with_callback(f)
        })
    }
}

/// Hand `callback` to a window scheduling API, getting it back on failure.
fn schedule(
    callback: TickCallback,
    api: &'static str,
    register: impl FnOnce(&web_sys::Window, &js_sys::Function) -> Result<i32, JsValue>,
) -> Result<(), TickCallback> {
    let Some(window) = web_sys::window() else {
        return Err(callback);
    };
    // Shared so the callback can be reclaimed if registration throws.
    let pending = Rc::new(RefCell::new(Some(callback)));
    let slot = Rc::clone(&pending);
    let closure = Closure::once(move || {
        if let Some(callback) = slot.borrow_mut().take() {
            callback();
        }
    });
    match register(&window, closure.as_ref().unchecked_ref()) {
        Ok(_) => {
            closure.forget();
            Ok(())
        }
        Err(error) => {
            warn!(api, ?error, "tick registration failed");
            pending.borrow_mut().take().map_or(Ok(()), Err)
        }
    }
}
