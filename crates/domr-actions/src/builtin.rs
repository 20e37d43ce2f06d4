#![forbid(unsafe_code)]

//! Built-in action types.
//!
//! | Type (aliases) | Task id | Effect |
//! |----------------|---------|--------|
//! | `text` (`textContent`) | `text` | text content |
//! | `attribute` (`attr`) | `attr-{name}` | attribute `name` |
//! | `toggleAttribute` (`toggleAttr`, `booleanAttribute`) | `toggle-attr-{bool}` | presence of a boolean attribute |
//! | `html` (`innerHTML`) | `html` | raw inner markup |
//! | `class` (`className`) | `class` | swaps the old value's classes for the new |
//! | `toggleClass` (`booleanClass`) | `toggle-class-{bool}` | presence of a class |
//!
//! `{bool}` is [`boolean_name`]. The boolean actions also honour `no`: the
//! name applied while the value is falsy.

use domr_core::{ActionConfig, DisplayValue, Element, Task};
use tracing::warn;

use crate::registry::{ActionRegistry, ActionTemplate};

/// Truthiness of a display value: everything except `""` and `"false"`.
#[inline]
#[must_use]
pub fn is_truthy(value: &DisplayValue) -> bool {
    value.is_truthy()
}

/// Name set by a boolean action: `name`, else `yes`, else the last segment
/// of the property path.
#[must_use]
pub fn boolean_name<'a>(property: &'a str, config: &'a ActionConfig) -> &'a str {
    config
        .name
        .as_deref()
        .or(config.yes.as_deref())
        .unwrap_or_else(|| property.rsplit('.').next().unwrap_or(property))
}

pub(crate) fn install<E: Element>(registry: &mut ActionRegistry<E>) {
    registry
        .register("text", |_, _| ActionTemplate::new("text", set_text::<E>))
        .register("attribute", |_, config| {
            let name = config.name.as_deref().unwrap_or_default();
            ActionTemplate::new(format!("attr-{name}"), set_attribute::<E>)
        })
        .register("toggleAttribute", |property, config| {
            let name = boolean_name(property, config);
            ActionTemplate::new(format!("toggle-attr-{name}"), toggle_attribute::<E>)
        })
        .register("html", |_, _| ActionTemplate::new("html", set_html::<E>))
        .register("class", |_, _| ActionTemplate::new("class", swap_classes::<E>))
        .register("toggleClass", |property, config| {
            let name = boolean_name(property, config);
            ActionTemplate::new(format!("toggle-class-{name}"), toggle_class::<E>)
        });

    for (alias, target) in [
        ("textContent", "text"),
        ("attr", "attribute"),
        ("toggleAttr", "toggleAttribute"),
        ("booleanAttribute", "toggleAttribute"),
        ("innerHTML", "html"),
        ("className", "class"),
        ("booleanClass", "toggleClass"),
    ] {
        registry.alias(alias, target);
    }
}

fn set_text<E: Element>(task: &Task<E>) {
    task.element.set_text_content(task.value().as_str());
}

fn set_attribute<E: Element>(task: &Task<E>) {
    match task.config().name.as_deref() {
        Some(name) if !name.is_empty() => task.element.set_attribute(name, task.value().as_str()),
        _ => warn!(property = task.property(), "attribute action without a name"),
    }
}

fn toggle_attribute<E: Element>(task: &Task<E>) {
    let config = task.config();
    let on = boolean_name(task.property(), config);
    let off = config.no.as_deref().filter(|n| !n.is_empty());
    let el = &task.element;
    if task.value().is_truthy() {
        if let Some(off) = off {
            el.remove_attribute(off);
        }
        el.set_attribute(on, "");
    } else {
        el.remove_attribute(on);
        if let Some(off) = off {
            el.set_attribute(off, "");
        }
    }
}

fn set_html<E: Element>(task: &Task<E>) {
    task.element.set_inner_html(task.value().as_str());
}

fn swap_classes<E: Element>(task: &Task<E>) {
    if let Some(old) = task.old_value() {
        remove_tokens(&task.element, old.as_str());
    }
    add_tokens(&task.element, task.value().as_str());
}

fn toggle_class<E: Element>(task: &Task<E>) {
    let config = task.config();
    let on = boolean_name(task.property(), config);
    let off = config.no.as_deref().unwrap_or_default();
    let (remove, add) = if task.value().is_truthy() { (off, on) } else { (on, off) };
    remove_tokens(&task.element, remove);
    add_tokens(&task.element, add);
}

fn add_tokens<E: Element>(el: &E, classes: &str) {
    let tokens: Vec<&str> = classes.split_whitespace().collect();
    if !tokens.is_empty() {
        el.add_classes(&tokens);
    }
}

fn remove_tokens<E: Element>(el: &E, classes: &str) {
    let tokens: Vec<&str> = classes.split_whitespace().collect();
    if !tokens.is_empty() {
        el.remove_classes(&tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domr_core::Payload;
    use domr_harness::Node;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn run(el: &Node, property: &str, config: ActionConfig, value: &str, old: Option<&str>) {
        let registry = ActionRegistry::<Node>::builtin();
        let template = registry.template(property, &config).unwrap();
        template
            .task(el.clone())
            .with_payload(Payload {
                property: Some(property.to_owned()),
                value: value.into(),
                old_value: old.map(DisplayValue::from),
                config: Some(Rc::new(config)),
            })
            .run();
    }

    fn id_of(property: &str, config: &ActionConfig) -> String {
        ActionRegistry::<Node>::builtin()
            .template(property, config)
            .unwrap()
            .id
            .into_owned()
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&"".into()));
        assert!(!is_truthy(&"false".into()));
        assert!(is_truthy(&"0".into()));
        assert!(is_truthy(&"true".into()));
        assert!(is_truthy(&" ".into()));
    }

    #[test]
    fn boolean_name_precedence() {
        let named = ActionConfig::new("toggleClass").name("n").yes("y");
        assert_eq!(boolean_name("a.b", &named), "n");
        let yes = ActionConfig::new("toggleClass").yes("y");
        assert_eq!(boolean_name("a.b", &yes), "y");
        assert_eq!(boolean_name("user.active", ActionConfig::empty()), "active");
        assert_eq!(boolean_name("flag", ActionConfig::empty()), "flag");
    }

    #[test]
    fn ids_follow_names() {
        assert_eq!(id_of("t", &ActionConfig::new("textContent")), "text");
        assert_eq!(id_of("src", &ActionConfig::new("attr").name("src")), "attr-src");
        assert_eq!(
            id_of("isOpen", &ActionConfig::new("booleanAttribute").name("open")),
            "toggle-attr-open"
        );
        assert_eq!(id_of("a.visible", &ActionConfig::new("toggleClass")), "toggle-class-visible");
        assert_eq!(id_of("x", &ActionConfig::new("innerHTML")), "html");
        assert_eq!(id_of("x", &ActionConfig::new("className")), "class");
    }

    #[test]
    fn text_and_html() {
        let el = Node::new("p");
        run(&el, "title", ActionConfig::new("text"), "a < b", None);
        assert_eq!(el.text_content(), "a < b");

        run(&el, "body", ActionConfig::new("html"), "<b>bold</b>", None);
        assert_eq!(el.inner_html(), "<b>bold</b>");
    }

    #[test]
    fn attribute_sets_named_attribute() {
        let el = Node::new("img");
        run(&el, "image", ActionConfig::new("attr").name("src"), "a.png", None);
        assert_eq!(el.attribute("src").as_deref(), Some("a.png"));
    }

    #[test]
    fn attribute_without_name_is_skipped() {
        let el = Node::new("img");
        run(&el, "image", ActionConfig::new("attr"), "a.png", None);
        assert_eq!(el.mutation_count(), 0);
    }

    #[test]
    fn toggle_attribute_with_no_variant() {
        let el = Node::new("details");
        let config = || ActionConfig::new("toggleAttr").yes("open").no("closed");

        run(&el, "isOpen", config(), "true", None);
        assert!(el.has_attribute("open"));
        assert!(!el.has_attribute("closed"));

        run(&el, "isOpen", config(), "false", None);
        assert!(!el.has_attribute("open"));
        assert_eq!(el.attribute("closed").as_deref(), Some(""));

        run(&el, "isOpen", config(), "1", None);
        assert_eq!(el.attribute("open").as_deref(), Some(""));
        assert!(!el.has_attribute("closed"));
    }

    #[test]
    fn toggle_attribute_defaults_to_property_segment() {
        let el = Node::new("button");
        run(&el, "form.disabled", ActionConfig::new("toggleAttribute"), "", None);
        assert!(!el.has_attribute("disabled"));
        run(&el, "form.disabled", ActionConfig::new("toggleAttribute"), "0", None);
        assert!(el.has_attribute("disabled"));
    }

    #[test]
    fn class_swaps_old_tokens_for_new() {
        let el = Node::new("div").with_class("keep");
        run(&el, "state", ActionConfig::new("class"), "foo bar", None);
        assert_eq!(el.class_name(), "keep foo bar");

        run(&el, "state", ActionConfig::new("class"), "baz", Some("foo bar"));
        assert_eq!(el.class_name(), "keep baz");

        run(&el, "state", ActionConfig::new("class"), "", Some("baz"));
        assert_eq!(el.class_name(), "keep");
    }

    #[test]
    fn toggle_class_yes_and_no() {
        let el = Node::new("div");
        let config = || ActionConfig::new("toggleClass").yes("is-on").no("is-off");

        run(&el, "enabled", config(), "false", None);
        assert_eq!(el.class_name(), "is-off");

        run(&el, "enabled", config(), "yes", None);
        assert_eq!(el.class_name(), "is-on");
    }

    #[test]
    fn toggle_class_without_no_only_toggles_name() {
        let el = Node::new("div");
        run(&el, "user.active", ActionConfig::new("booleanClass"), "true", None);
        assert!(el.has_class("active"));
        run(&el, "user.active", ActionConfig::new("booleanClass"), "", None);
        assert!(el.classes().is_empty());
    }
}
