#![forbid(unsafe_code)]

//! Test harness for domr.
//!
//! - [`Node`]: an in-memory element tree implementing
//!   [`Element`](domr_core::Element), with mutation counters so tests can
//!   assert that nothing was written.
//! - [`FrameClock`]: a manual [`TickSource`](domr_core::TickSource). Frames
//!   advance only when a test calls [`FrameClock::tick`].
//! - [`Outlet`]: the small reference fixture most binding tests start from.
//!
//! Selector support is small: one compound selector made of a
//! tag, `#id`, `.class`, and `[attr]` / `[attr="value"]` parts. Anything else
//! matches nothing.

pub mod clock;
pub mod node;
pub mod selector;

pub use clock::FrameClock;
pub use node::Node;
pub use selector::Selector;

/// The reference fixture: `<div id="outlet"><h1></h1><img><p role="description"></p></div>`.
#[derive(Debug, Clone)]
pub struct Outlet {
    /// The `div#outlet` root.
    pub root: Node,
    /// The heading.
    pub h1: Node,
    /// The image.
    pub img: Node,
    /// The paragraph with `role="description"`.
    pub p: Node,
}

impl Outlet {
    /// Build a fresh fixture.
    #[must_use]
    pub fn new() -> Self {
        let h1 = Node::new("h1");
        let img = Node::new("img");
        let p = Node::new("p").with_attr("role", "description");
        let root = Node::new("div")
            .with_attr("id", "outlet")
            .with_child(h1.clone())
            .with_child(img.clone())
            .with_child(p.clone());
        Self { root, h1, img, p }
    }
}

impl Default for Outlet {
    fn default() -> Self {
        Self::new()
    }
}
