#![forbid(unsafe_code)]

//! domr public facade and prelude.
//!
//! ```
//! # #[cfg(feature = "harness")] {
//! use domr::prelude::*;
//! use domr::harness::{FrameClock, Node};
//!
//! let root = Node::new("div").with_child(Node::new("h1"));
//! let mut binding = domr::create(root.clone(), BindingConfig::new().text("title", "h1"));
//! binding.render(&serde_json::json!({ "title": "Lorem" })).unwrap();
//! FrameClock::global().tick();
//! assert_eq!(root.text_content(), "Lorem");
//! # }
//! ```

pub use domr_actions as actions;
pub use domr_binding as binding;
pub use domr_runtime as runtime;

#[cfg(feature = "harness")]
pub use domr_harness as harness;
#[cfg(target_arch = "wasm32")]
pub use domr_web as web;

pub use domr_actions::{ActionRegistry, ActionTemplate};
pub use domr_binding::Binding;
pub use domr_core::{
    ActionConfig, BindError, BindingConfig, BindingEntry, DisplayValue, Element, GroupId, Task,
    TickSource,
};
pub use domr_runtime::{Batcher, FallbackTicker, FlushReport, UnavailableTicker};

#[cfg(target_arch = "wasm32")]
pub use domr_web::DomElement;

/// Bind `root` to `config` using the shared batcher and built-in actions.
#[must_use]
pub fn create<E: Element>(root: E, config: BindingConfig) -> Binding<E> {
    Binding::new(root, config)
}

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        ActionConfig, BindError, Binding, BindingConfig, Element, create,
    };
    #[cfg(target_arch = "wasm32")]
    pub use crate::DomElement;
}
