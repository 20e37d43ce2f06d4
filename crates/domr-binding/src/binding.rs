#![forbid(unsafe_code)]

//! Diff-and-dispatch engine.
//!
//! A [`Binding`] owns a root element and a fixed map of property paths to
//! action records. Each render looks every path up in the model data,
//! normalizes it to a [`DisplayValue`], and compares it to what the binding
//! rendered last. Only changed properties produce tasks, and those tasks are
//! deferred to the batcher rather than applied on the spot.
//!
//! # Lifecycle
//!
//! ```text
//! new ──render──▶ tasks queued ──tick──▶ DOM updated
//!  │                   │
//!  └──destroy──────────┴──▶ group cancelled, state dropped
//! ```
//!
//! Dropping a `Binding` without calling [`Binding::destroy`] leaves its
//! queued tasks in place.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use domr_actions::ActionRegistry;
use domr_core::{
    ActionConfig, BindError, BindingConfig, DisplayValue, Element, GroupId, Payload,
    ROOT_SELECTOR, Task, lookup_path,
};
use domr_runtime::Batcher;
use serde_json::Value;
use tracing::{debug, trace};

/// Task id of the post-render callback.
pub const CALLBACK_ID: &str = "callback";

/// A property path and the records it fans out to.
struct Property {
    path: String,
    records: Vec<Rc<ActionConfig>>,
}

struct Live<E> {
    root: E,
    batcher: Batcher<E>,
    registry: Rc<ActionRegistry<E>>,
    properties: Rc<[Property]>,
    /// Resolved elements by selector; `"@"` is pre-seeded with the root.
    elements: AHashMap<String, E>,
    /// Last rendered display value per path. Absent means never rendered.
    values: AHashMap<String, DisplayValue>,
}

/// Binds model data to elements under a root.
pub struct Binding<E: Element> {
    group: GroupId,
    live: Option<Live<E>>,
}

impl<E: Element> Binding<E> {
    /// Bind `root` using the per-thread shared batcher and the built-in
    /// action types.
    #[must_use]
    pub fn new(root: E, config: BindingConfig) -> Self {
        Self::with_parts(
            root,
            config,
            Batcher::shared(),
            Rc::new(ActionRegistry::builtin()),
        )
    }

    /// Bind `root` with an explicit batcher and registry.
    #[must_use]
    pub fn with_parts(
        root: E,
        config: BindingConfig,
        batcher: Batcher<E>,
        registry: Rc<ActionRegistry<E>>,
    ) -> Self {
        let properties: Rc<[Property]> = config
            .into_iter()
            .map(|(path, entry)| Property {
                path,
                records: entry.into_records().into_iter().map(Rc::new).collect(),
            })
            .collect();
        let mut elements = AHashMap::new();
        elements.insert(ROOT_SELECTOR.to_owned(), root.clone());

        let group = GroupId::next();
        debug!(group = group.id(), properties = properties.len(), "binding created");
        Self {
            group,
            live: Some(Live {
                root,
                batcher,
                registry,
                properties,
                elements,
                values: AHashMap::new(),
            }),
        }
    }

    /// Diff `data` against the last render and queue tasks for what changed.
    ///
    /// Falsy data (`null`, `false`, `0`, `""`) is treated as "no data" and
    /// does nothing, as does rendering a destroyed binding.
    ///
    /// # Errors
    ///
    /// [`BindError::Lookup`] when a changed property targets a selector with
    /// no match under the root, and [`BindError::Config`] when its action
    /// type is not registered. Tasks queued before the failure stay queued.
    pub fn render(&mut self, data: &Value) -> Result<(), BindError> {
        self.render_inner(data, None)
    }

    /// Like [`render`](Self::render), and run `callback` with the root after
    /// this render's tasks, in the same flush.
    ///
    /// The callback is only queued when at least one property changed.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render); the callback is not queued on error.
    pub fn render_with(&mut self, data: &Value, callback: impl FnOnce(&E) + 'static) -> Result<(), BindError> {
        self.render_inner(data, Some(Box::new(callback)))
    }

    fn render_inner(&mut self, data: &Value, callback: Option<Box<dyn FnOnce(&E)>>) -> Result<(), BindError> {
        if is_no_data(data) {
            return Ok(());
        }
        let group = self.group;
        let Some(live) = self.live.as_mut() else {
            return Ok(());
        };

        let properties = Rc::clone(&live.properties);
        let mut changed = 0_usize;
        for property in properties.iter() {
            let value = DisplayValue::from_json(lookup_path(data, &property.path));
            let old_value = live.values.get(&property.path);
            if old_value == Some(&value) {
                continue;
            }
            let old_value = live.values.insert(property.path.clone(), value.clone());
            trace!(path = %property.path, value = %value, "property changed");
            changed += 1;
            for record in &property.records {
                live.process(group, &property.path, Rc::clone(record), &value, old_value.as_ref())?;
            }
        }

        if let Some(callback) = callback.filter(|_| changed > 0) {
            let slot = RefCell::new(Some(callback));
            let task = Task::new(live.root.clone(), CALLBACK_ID, move |task: &Task<E>| {
                if let Some(callback) = slot.borrow_mut().take() {
                    callback(&task.element);
                }
            })
            .with_group(group);
            live.batcher.push_last(task);
        }
        Ok(())
    }

    /// Resolve `record`'s target and queue its action with the given values.
    ///
    /// This is what [`render`](Self::render) calls for every record of a
    /// changed property; it does not consult or update the value cache.
    ///
    /// # Errors
    ///
    /// [`BindError::Lookup`] or [`BindError::Config`], as for `render`.
    pub fn process(
        &mut self,
        path: &str,
        record: impl Into<Rc<ActionConfig>>,
        value: &DisplayValue,
        old_value: Option<&DisplayValue>,
    ) -> Result<(), BindError> {
        let group = self.group;
        match self.live.as_mut() {
            Some(live) => live.process(group, path, record.into(), value, old_value),
            None => Ok(()),
        }
    }

    /// Cancel this binding's queued tasks and drop its state. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(live) = self.live.take() {
            let cancelled = live.batcher.cancel(self.group);
            debug!(group = self.group.id(), cancelled, "binding destroyed");
        }
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.live.is_none()
    }

    /// The root element, until destroyed.
    #[must_use]
    pub fn root(&self) -> Option<&E> {
        self.live.as_ref().map(|live| &live.root)
    }

    /// Configured property paths in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.live
            .iter()
            .flat_map(|live| live.properties.iter().map(|p| p.path.as_str()))
    }

    /// Last rendered display value of `path`; `None` if it never rendered.
    #[must_use]
    pub fn cached_value(&self, path: &str) -> Option<&DisplayValue> {
        self.live.as_ref()?.values.get(path)
    }

    /// Group tagging every task this binding queues.
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// The batcher this binding queues into, until destroyed.
    #[must_use]
    pub fn batcher(&self) -> Option<&Batcher<E>> {
        self.live.as_ref().map(|live| &live.batcher)
    }
}

impl<E: Element> Live<E> {
    fn process(
        &mut self,
        group: GroupId,
        path: &str,
        record: Rc<ActionConfig>,
        value: &DisplayValue,
        old_value: Option<&DisplayValue>,
    ) -> Result<(), BindError> {
        let element = self.resolve(&record)?;
        let template = self.registry.template(path, &record)?;
        let task = template.task(element).with_group(group).with_payload(Payload {
            property: Some(path.to_owned()),
            value: value.clone(),
            old_value: old_value.cloned(),
            config: Some(record),
        });
        self.batcher.push(task);
        Ok(())
    }

    fn resolve(&mut self, record: &ActionConfig) -> Result<E, BindError> {
        let selector = record.target_selector().unwrap_or(Cow::Borrowed(""));
        if let Some(element) = self.elements.get(selector.as_ref()) {
            return Ok(element.clone());
        }
        let found = if selector.is_empty() {
            None
        } else {
            self.root.query_selector(&selector)
        };
        match found {
            Some(element) => {
                self.elements.insert(selector.into_owned(), element.clone());
                Ok(element)
            }
            None => Err(BindError::Lookup {
                selector: selector.into_owned(),
                root: self.root.outer_html(),
            }),
        }
    }
}

impl<E: Element> fmt::Debug for Binding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Binding");
        s.field("group", &self.group);
        match &self.live {
            Some(live) => s
                .field("root", &live.root)
                .field("properties", &live.properties.len())
                .field("cached", &live.values.len())
                .finish(),
            None => s.field("destroyed", &true).finish(),
        }
    }
}

/// Whether `data` is falsy and so carries nothing to render.
fn is_no_data(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
