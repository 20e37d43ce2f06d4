#![forbid(unsafe_code)]

//! In-memory element tree.
//!
//! A [`Node`] is a shared handle (`Rc<RefCell<..>>`); clones refer to the same
//! element and compare equal, like host DOM handles. Every call through the
//! [`Element`] trait bumps the node's mutation counter.
//!
//! Content is one of: child elements, a text node (after
//! `set_text_content`), or raw markup (after `set_inner_html`). Raw markup is
//! stored verbatim and never parsed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use domr_core::{Element, TickSource};
use indexmap::IndexMap;

use crate::clock::FrameClock;
use crate::selector::Selector;

const VOID_TAGS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta", "source"];

#[derive(Debug, Clone)]
enum Content {
    Children(Vec<Node>),
    Text(String),
    Html(String),
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: IndexMap<String, String>,
    classes: Vec<String>,
    content: Content,
    mutations: u64,
}

/// Shared handle to an in-memory element.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            classes: Vec::new(),
            content: Content::Children(Vec::new()),
            mutations: 0,
        })))
    }

    /// Builder: set an attribute without counting a mutation.
    #[must_use]
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        {
            let mut data = self.0.borrow_mut();
            if name == "class" {
                data.classes = split_classes(value);
            } else {
                data.attributes.insert(name.to_owned(), value.to_owned());
            }
        }
        self
    }

    /// Builder: add a class without counting a mutation.
    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        push_classes(&mut self.0.borrow_mut().classes, &[class]);
        self
    }

    /// Builder: append a child element.
    #[must_use]
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    /// Builder: set text content without counting a mutation.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.0.borrow_mut().content = Content::Text(text.to_owned());
        self
    }

    /// Append a child element, replacing text or raw markup content.
    pub fn append_child(&self, child: Node) {
        let mut data = self.0.borrow_mut();
        match &mut data.content {
            Content::Children(children) => children.push(child),
            content => *content = Content::Children(vec![child]),
        }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// Attribute value; `class` reads the joined class list.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        let data = self.0.borrow();
        if name == "class" {
            return (!data.classes.is_empty()).then(|| data.classes.join(" "));
        }
        data.attributes.get(name).cloned()
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Class tokens in insertion order.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    /// Whether the class token is present.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    /// Space-joined class list (`""` when empty).
    #[must_use]
    pub fn class_name(&self) -> String {
        self.0.borrow().classes.join(" ")
    }

    /// Concatenated text of the subtree. Raw markup is returned verbatim.
    #[must_use]
    pub fn text_content(&self) -> String {
        match &self.0.borrow().content {
            Content::Text(text) | Content::Html(text) => text.clone(),
            Content::Children(children) => children.iter().map(Node::text_content).collect(),
        }
    }

    /// Serialized inner markup.
    #[must_use]
    pub fn inner_html(&self) -> String {
        match &self.0.borrow().content {
            Content::Text(text) => escape_text(text),
            Content::Html(html) => html.clone(),
            Content::Children(children) => children.iter().map(Element::outer_html).collect(),
        }
    }

    /// Child elements (empty once text or markup replaced them).
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        match &self.0.borrow().content {
            Content::Children(children) => children.clone(),
            Content::Text(_) | Content::Html(_) => Vec::new(),
        }
    }

    /// Mutations applied to this node through [`Element`].
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.0.borrow().mutations
    }

    /// Mutations applied to this node and all of its current descendants.
    #[must_use]
    pub fn subtree_mutations(&self) -> u64 {
        self.mutation_count()
            + self
                .children()
                .iter()
                .map(Node::subtree_mutations)
                .sum::<u64>()
    }

    /// Whether this node matches a parsed selector.
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        let data = self.0.borrow();
        if selector.tag.as_ref().is_some_and(|tag| *tag != data.tag) {
            return false;
        }
        if !selector
            .ids
            .iter()
            .all(|id| data.attributes.get("id") == Some(id))
        {
            return false;
        }
        if !selector
            .classes
            .iter()
            .all(|class| data.classes.contains(class))
        {
            return false;
        }
        selector.attributes.iter().all(|(name, expected)| {
            let actual = if name == "class" {
                (!data.classes.is_empty()).then(|| data.classes.join(" "))
            } else {
                data.attributes.get(name).cloned()
            };
            match (actual, expected) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }

    fn find_descendant(&self, selector: &Selector) -> Option<Node> {
        for child in self.children() {
            if child.matches(selector) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(selector) {
                return Some(found);
            }
        }
        None
    }

    fn mutate(&self, f: impl FnOnce(&mut NodeData)) {
        let mut data = self.0.borrow_mut();
        f(&mut data);
        data.mutations += 1;
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Node")
            .field("tag", &data.tag)
            .field("attributes", &data.attributes)
            .field("classes", &data.classes)
            .field("mutations", &data.mutations)
            .finish_non_exhaustive()
    }
}

impl Element for Node {
    fn query_selector(&self, selector: &str) -> Option<Self> {
        let selector = Selector::parse(selector)?;
        self.find_descendant(&selector)
    }

    fn set_text_content(&self, text: &str) {
        self.mutate(|data| data.content = Content::Text(text.to_owned()));
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.mutate(|data| {
            if name == "class" {
                data.classes = split_classes(value);
            } else {
                data.attributes.insert(name.to_owned(), value.to_owned());
            }
        });
    }

    fn remove_attribute(&self, name: &str) {
        self.mutate(|data| {
            if name == "class" {
                data.classes.clear();
            } else {
                data.attributes.shift_remove(name);
            }
        });
    }

    fn set_inner_html(&self, html: &str) {
        self.mutate(|data| data.content = Content::Html(html.to_owned()));
    }

    fn add_classes(&self, classes: &[&str]) {
        self.mutate(|data| push_classes(&mut data.classes, classes));
    }

    fn remove_classes(&self, classes: &[&str]) {
        self.mutate(|data| data.classes.retain(|c| !classes.contains(&c.as_str())));
    }

    fn outer_html(&self) -> String {
        let (tag, attrs) = {
            let data = self.0.borrow();
            let mut attrs = String::new();
            for (name, value) in &data.attributes {
                attrs.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
            }
            if !data.classes.is_empty() {
                attrs.push_str(&format!(" class=\"{}\"", escape_attr(&data.classes.join(" "))));
            }
            (data.tag.clone(), attrs)
        };
        if VOID_TAGS.contains(&tag.as_str()) {
            format!("<{tag}{attrs}>")
        } else {
            format!("<{tag}{attrs}>{}</{tag}>", self.inner_html())
        }
    }

    fn frame_source() -> Rc<dyn TickSource> {
        Rc::new(FrameClock::global())
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut classes = Vec::new();
    push_classes(&mut classes, &value.split_whitespace().collect::<Vec<_>>());
    classes
}

fn push_classes(list: &mut Vec<String>, classes: &[&str]) {
    for class in classes {
        if !class.is_empty() && !list.iter().any(|c| c == class) {
            list.push((*class).to_owned());
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree() -> (Node, Node, Node) {
        let inner = Node::new("span").with_class("deep");
        let section = Node::new("section")
            .with_attr("id", "main")
            .with_child(inner.clone());
        let root = Node::new("div").with_child(section.clone());
        (root, section, inner)
    }

    #[test]
    fn clones_share_identity() {
        let a = Node::new("div");
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Node::new("div"));
    }

    #[test]
    fn query_is_depth_first_and_excludes_self() {
        let (root, section, inner) = tree();
        assert_eq!(root.query_selector("#main"), Some(section));
        assert_eq!(root.query_selector(".deep"), Some(inner));
        assert_eq!(root.query_selector("div"), None);
        assert_eq!(root.query_selector("div p"), None);
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let first = Node::new("p");
        let second = Node::new("p");
        let root = Node::new("div")
            .with_child(Node::new("section").with_child(first.clone()))
            .with_child(second);
        assert_eq!(root.query_selector("p"), Some(first));
    }

    #[test]
    fn mutators_count_and_apply() {
        let node = Node::new("p");
        node.set_text_content("hello");
        node.set_attribute("data-x", "1");
        node.add_classes(&["a", "b", "a"]);
        node.remove_classes(&["a"]);
        node.remove_attribute("data-x");
        assert_eq!(node.text_content(), "hello");
        assert!(!node.has_attribute("data-x"));
        assert_eq!(node.classes(), vec!["b"]);
        assert_eq!(node.mutation_count(), 5);
    }

    #[test]
    fn builders_do_not_count_mutations() {
        let (root, _, _) = tree();
        assert_eq!(root.subtree_mutations(), 0);
    }

    #[test]
    fn class_attribute_is_the_class_list() {
        let node = Node::new("p").with_attr("class", "x  y");
        assert_eq!(node.attribute("class").as_deref(), Some("x y"));
        node.set_attribute("class", "z");
        assert_eq!(node.classes(), vec!["z"]);
        node.remove_attribute("class");
        assert_eq!(node.attribute("class"), None);
    }

    #[test]
    fn inner_html_is_stored_verbatim() {
        let node = Node::new("h1");
        node.set_inner_html("<strong>lorem</strong> ipsum");
        assert_eq!(node.inner_html(), "<strong>lorem</strong> ipsum");
        assert!(node.children().is_empty());
    }

    #[test]
    fn outer_html_escapes_and_handles_void_tags() {
        let node = Node::new("p").with_attr("title", "a \"b\"").with_text("1 < 2");
        assert_eq!(node.outer_html(), "<p title=\"a &quot;b&quot;\">1 &lt; 2</p>");
        assert_eq!(Node::new("img").with_attr("src", "x.png").outer_html(), "<img src=\"x.png\">");
    }
}
