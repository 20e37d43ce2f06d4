#![forbid(unsafe_code)]

//! `web_sys::Element` as a domr host element.

use std::ops::Deref;
use std::rc::Rc;

use domr_core::{Element, TickSource};
use domr_runtime::FallbackTicker;
use tracing::warn;

use crate::ticker::{RafTicker, TimeoutTicker};

/// A live DOM element. Equality is node identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomElement(web_sys::Element);

impl DomElement {
    /// Wrap a DOM element.
    #[must_use]
    pub fn new(element: web_sys::Element) -> Self {
        Self(element)
    }

    /// The wrapped element.
    #[must_use]
    pub fn as_web_sys(&self) -> &web_sys::Element {
        &self.0
    }

    /// Unwrap.
    #[must_use]
    pub fn into_inner(self) -> web_sys::Element {
        self.0
    }
}

impl From<web_sys::Element> for DomElement {
    fn from(element: web_sys::Element) -> Self {
        Self(element)
    }
}

impl Deref for DomElement {
    type Target = web_sys::Element;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Element for DomElement {
    fn query_selector(&self, selector: &str) -> Option<Self> {
        match self.0.query_selector(selector) {
            Ok(found) => found.map(Self),
            Err(error) => {
                warn!(selector, ?error, "querySelector rejected selector");
                None
            }
        }
    }

    fn set_text_content(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(error) = self.0.set_attribute(name, value) {
            warn!(name, ?error, "setAttribute failed");
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(error) = self.0.remove_attribute(name) {
            warn!(name, ?error, "removeAttribute failed");
        }
    }

    fn set_inner_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }

    fn add_classes(&self, classes: &[&str]) {
        let list = self.0.class_list();
        for class in classes {
            if let Err(error) = list.add_1(class) {
                warn!(class, ?error, "classList.add failed");
            }
        }
    }

    fn remove_classes(&self, classes: &[&str]) {
        let list = self.0.class_list();
        for class in classes {
            if let Err(error) = list.remove_1(class) {
                warn!(class, ?error, "classList.remove failed");
            }
        }
    }

    fn outer_html(&self) -> String {
        self.0.outer_html()
    }

    fn frame_source() -> Rc<dyn TickSource> {
        Rc::new(FallbackTicker::new(RafTicker, TimeoutTicker))
    }
}
