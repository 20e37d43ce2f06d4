#![forbid(unsafe_code)]

//! Action type registry.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use domr_core::{ActionConfig, BindError, Element, Executor, Task, TaskId};

use crate::builtin;

/// Task id and executor produced for one config record.
pub struct ActionTemplate<E> {
    /// Coalescing id of the tasks built from this template.
    pub id: TaskId,
    /// Executor shared by those tasks.
    pub execute: Executor<E>,
}

impl<E> ActionTemplate<E> {
    /// Build a template from an id and an executor closure.
    pub fn new(id: impl Into<TaskId>, execute: impl Fn(&Task<E>) + 'static) -> Self {
        Self {
            id: id.into(),
            execute: Rc::new(execute),
        }
    }

    /// Build a template around an existing shared executor.
    pub fn from_executor(id: impl Into<TaskId>, execute: Executor<E>) -> Self {
        Self {
            id: id.into(),
            execute,
        }
    }

    /// A task for `element` carrying this template's id and executor.
    pub fn task(&self, element: E) -> Task<E> {
        Task::from_executor(element, self.id.clone(), Rc::clone(&self.execute))
    }
}

impl<E> Clone for ActionTemplate<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            execute: Rc::clone(&self.execute),
        }
    }
}

impl<E> fmt::Debug for ActionTemplate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTemplate")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Factory called with `(property, config)` for every record of its type.
pub type ActionFactory<E> = Rc<dyn Fn(&str, &ActionConfig) -> ActionTemplate<E>>;

/// Mapping from action type name to factory.
pub struct ActionRegistry<E> {
    factories: AHashMap<String, ActionFactory<E>>,
}

impl<E: Element> ActionRegistry<E> {
    /// A registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: AHashMap::new(),
        }
    }

    /// A registry with the built-in types and their aliases.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        builtin::install(&mut registry);
        registry
    }

    /// Add or replace the factory for `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&str, &ActionConfig) -> ActionTemplate<E> + 'static,
    ) -> &mut Self {
        self.factories.insert(name.into(), Rc::new(factory));
        self
    }

    /// Make `alias` resolve to the factory currently registered as `target`.
    ///
    /// Returns `false` (and registers nothing) when `target` is unknown.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.factories.get(target) {
            Some(factory) => {
                let factory = Rc::clone(factory);
                self.factories.insert(alias.into(), factory);
                true
            }
            None => false,
        }
    }

    /// Whether a type is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The factory registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionFactory<E>> {
        self.factories.get(name)
    }

    /// Resolve `config`'s type and build its template.
    ///
    /// # Errors
    ///
    /// [`BindError::Config`] when the type is not registered.
    pub fn template(&self, property: &str, config: &ActionConfig) -> Result<ActionTemplate<E>, BindError> {
        let kind = config.kind_or_default();
        let factory = self.get(kind).ok_or_else(|| BindError::Config {
            kind: kind.to_owned(),
        })?;
        Ok(factory(property, config))
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<E: Element> Default for ActionRegistry<E> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<E> Clone for ActionRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<E> fmt::Debug for ActionRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("types", &self.factories.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domr_core::Payload;
    use domr_harness::Node;

    #[test]
    fn builtin_names_include_aliases() {
        let registry = ActionRegistry::<Node>::builtin();
        for name in [
            "text",
            "textContent",
            "attribute",
            "attr",
            "toggleAttribute",
            "toggleAttr",
            "booleanAttribute",
            "html",
            "innerHTML",
            "class",
            "className",
            "toggleClass",
            "booleanClass",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.type_names().len(), 13);
    }

    #[test]
    fn unknown_type_is_a_config_error() {
        let registry = ActionRegistry::<Node>::builtin();
        let err = registry
            .template("title", &ActionConfig::new("sparkle"))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"invalid [type]: "sparkle""#);
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let registry = ActionRegistry::<Node>::builtin();
        let template = registry
            .template("title", &ActionConfig::default().selector("h1"))
            .unwrap();
        assert_eq!(template.id, "text");
    }

    #[test]
    fn register_custom_type() {
        let mut registry = ActionRegistry::<Node>::empty();
        registry.register("data", |property, _config| {
            let attr = format!("data-{property}");
            ActionTemplate::new(attr.clone(), move |task: &Task<Node>| {
                task.element.set_attribute(&attr, task.value().as_str());
            })
        });

        let template = registry.template("id", &ActionConfig::new("data")).unwrap();
        assert_eq!(template.id, "data-id");

        let el = Node::new("div");
        template
            .task(el.clone())
            .with_payload(Payload {
                value: "42".into(),
                ..Payload::default()
            })
            .run();
        assert_eq!(el.attribute("data-id").as_deref(), Some("42"));
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = ActionRegistry::<Node>::builtin();
        registry.register("text", |_, _| ActionTemplate::new("shout", |_: &Task<Node>| {}));
        let template = registry.template("title", &ActionConfig::new("text")).unwrap();
        assert_eq!(template.id, "shout");
        // Aliases keep the factory they were created with.
        let template = registry.template("title", &ActionConfig::new("textContent")).unwrap();
        assert_eq!(template.id, "text");
    }

    #[test]
    fn alias_requires_known_target() {
        let mut registry = ActionRegistry::<Node>::builtin();
        assert!(registry.alias("txt", "text"));
        assert!(registry.contains("txt"));
        assert!(!registry.alias("nope", "missing"));
        assert!(!registry.contains("nope"));
    }
}
