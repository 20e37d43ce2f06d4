#![forbid(unsafe_code)]

//! Browser back-end for domr.
//!
//! - [`DomElement`]: wraps `web_sys::Element` and implements
//!   [`Element`](domr_core::Element). DOM exceptions are logged with
//!   `tracing::warn!` and swallowed so executors never fail.
//! - [`RafTicker`] / [`TimeoutTicker`]: `requestAnimationFrame` and
//!   `setTimeout(.., 0)` as [`TickSource`](domr_core::TickSource)s.
//!   [`DomElement::frame_source`](domr_core::Element::frame_source) combines
//!   them with [`FallbackTicker`](domr_runtime::FallbackTicker).
//!
//! Everything here only exists on `wasm32`.

#[cfg(target_arch = "wasm32")]
pub mod element;
#[cfg(target_arch = "wasm32")]
pub mod ticker;

#[cfg(target_arch = "wasm32")]
pub use element::DomElement;
#[cfg(target_arch = "wasm32")]
pub use ticker::{RafTicker, TimeoutTicker};
