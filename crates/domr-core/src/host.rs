#![forbid(unsafe_code)]

//! Capabilities consumed from the host environment.
//!
//! A host provides two things: element handles that can be queried and
//! mutated ([`Element`]), and a way to run a callback once on the next
//! rendering frame ([`TickSource`]). Browser hosts implement these on top of
//! `web-sys`; tests use the in-memory DOM from `domr-harness`.

use std::fmt;
use std::rc::Rc;

/// Callback armed on a [`TickSource`].
pub type TickCallback = Box<dyn FnOnce()>;

/// Host scheduler capability: "run this once on the next tick".
///
/// Implementations bound to a rendering frame (`requestAnimationFrame`) are
/// preferred; a generic deferred tick (`setTimeout(0)`) is an acceptable
/// fallback.
pub trait TickSource {
    /// Schedule `callback` to run once on the next tick.
    ///
    /// # Errors
    ///
    /// Hands the callback back unchanged when this source cannot schedule
    /// (e.g., no window object), so a caller can try another source.
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback>;
}

impl<T: TickSource + ?Sized> TickSource for Rc<T> {
    fn schedule_once(&self, callback: TickCallback) -> Result<(), TickCallback> {
        (**self).schedule_once(callback)
    }
}

/// Host DOM capability.
///
/// Handles are cheap to clone and compare by identity: two handles are equal
/// iff they refer to the same node. Mutators take `&self` because host nodes
/// are shared, interior-mutable objects.
pub trait Element: Clone + PartialEq + fmt::Debug + 'static {
    /// First descendant matching `selector`, or `None`.
    ///
    /// The search is scoped to this element's subtree and excludes the
    /// element itself.
    fn query_selector(&self, selector: &str) -> Option<Self>;

    /// Replace the element's children with a single text node.
    fn set_text_content(&self, text: &str);

    /// Set (or overwrite) an attribute.
    fn set_attribute(&self, name: &str, value: &str);

    /// Remove an attribute. Removing a missing attribute is a no-op.
    fn remove_attribute(&self, name: &str);

    /// Replace the element's children with raw markup.
    fn set_inner_html(&self, html: &str);

    /// Add class tokens. Tokens already present are kept once.
    fn add_classes(&self, classes: &[&str]);

    /// Remove class tokens. Missing tokens are ignored.
    fn remove_classes(&self, classes: &[&str]);

    /// Serialized markup of the element, used in diagnostics.
    fn outer_html(&self) -> String;

    /// Frame clock used by the shared default batcher for this element type.
    fn frame_source() -> Rc<dyn TickSource>;
}
