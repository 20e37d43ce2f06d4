#![forbid(unsafe_code)]

//! Binding configuration.
//!
//! A [`BindingConfig`] maps property paths of the model to one or more
//! [`ActionConfig`] records. It is plain data: build it in code or load it
//! from JSON in the same shape the browser library accepts.
//!
//! ```
//! use domr_core::config::{ActionConfig, BindingConfig};
//!
//! let from_json = BindingConfig::from_json_str(
//!     r#"{
//!         "title": "h1",
//!         "picture": { "selector": "img", "type": "attr", "name": "src" },
//!         "summary": [
//!             { "selector": "p" },
//!             { "role": "caption", "type": "html" }
//!         ]
//!     }"#,
//! )
//! .unwrap();
//!
//! let in_code = BindingConfig::new()
//!     .text("title", "h1")
//!     .bind("picture", ActionConfig::new("attr").selector("img").name("src"))
//!     .bind_all(
//!         "summary",
//!         vec![
//!             ActionConfig::default().selector("p"),
//!             ActionConfig::new("html").role("caption"),
//!         ],
//!     );
//!
//! assert_eq!(from_json, in_code);
//! ```
//!
//! # Invariants
//!
//! 1. Property paths are unique; re-binding a path replaces its entry but
//!    keeps its original position.
//! 2. Iteration follows declaration order, which is also the order in which
//!    a render pushes tasks.

use std::borrow::Cow;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action type used when a record has no `type`.
pub const DEFAULT_ACTION: &str = "text";

/// Selector that denotes the binding's root element.
pub const ROOT_SELECTOR: &str = "@";

/// One binding target: where to write and which action to use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Selector scoped to the root; `"@"` is the root itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// ARIA role, used as `[role="…"]` when no selector is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Action type name; defaults to [`DEFAULT_ACTION`].
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Attribute or class name, depending on the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name applied when a boolean action is truthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes: Option<String>,
    /// Name applied when a boolean action is falsy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    /// Keys not understood by the built-in actions, kept for custom ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionConfig {
    /// Create a record for the given action type.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Shared empty record.
    #[must_use]
    pub fn empty() -> &'static Self {
        static EMPTY: OnceLock<ActionConfig> = OnceLock::new();
        EMPTY.get_or_init(Self::default)
    }

    /// Set the selector.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the attribute or class name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the truthy name.
    #[must_use]
    pub fn yes(mut self, yes: impl Into<String>) -> Self {
        self.yes = Some(yes.into());
        self
    }

    /// Set the falsy name.
    #[must_use]
    pub fn no(mut self, no: impl Into<String>) -> Self {
        self.no = Some(no.into());
        self
    }

    /// Attach an extra key for custom actions.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The action type name, falling back to [`DEFAULT_ACTION`].
    #[must_use]
    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_ACTION)
    }

    /// Selector to resolve: the explicit selector, else `[role="…"]`.
    #[must_use]
    pub fn target_selector(&self) -> Option<Cow<'_, str>> {
        match (&self.selector, &self.role) {
            (Some(selector), _) if !selector.is_empty() => Some(Cow::Borrowed(selector.as_str())),
            (_, Some(role)) if !role.is_empty() => Some(Cow::Owned(format!("[role=\"{role}\"]"))),
            _ => None,
        }
    }
}

/// Config for one property: a bare selector, one record, or a fan-out list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindingEntry {
    /// Selector with the default text action.
    Selector(String),
    /// One structured record.
    Record(ActionConfig),
    /// Several targets for the same property, applied in order.
    List(Vec<ActionConfig>),
}

impl BindingEntry {
    /// Expand into the ordered list of records.
    #[must_use]
    pub fn into_records(self) -> Vec<ActionConfig> {
        match self {
            Self::Selector(selector) => vec![ActionConfig::new(DEFAULT_ACTION).selector(selector)],
            Self::Record(record) => vec![record],
            Self::List(records) => records,
        }
    }

    /// Number of targets this entry fans out to.
    #[must_use]
    pub fn target_count(&self) -> usize {
        match self {
            Self::Selector(_) | Self::Record(_) => 1,
            Self::List(records) => records.len(),
        }
    }
}

impl From<&str> for BindingEntry {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for BindingEntry {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<ActionConfig> for BindingEntry {
    fn from(record: ActionConfig) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<ActionConfig>> for BindingEntry {
    fn from(records: Vec<ActionConfig>) -> Self {
        Self::List(records)
    }
}

/// Ordered property-path → entry map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingConfig {
    entries: IndexMap<String, BindingEntry>,
}

impl BindingConfig {
    /// Create an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `path: entry` pairs.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the text is not valid JSON or does
    /// not have the expected shape.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the value does not have the
    /// expected shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Bind `path` to any entry.
    #[must_use]
    pub fn entry(mut self, path: impl Into<String>, entry: impl Into<BindingEntry>) -> Self {
        self.entries.insert(path.into(), entry.into());
        self
    }

    /// Bind `path` to the text content of `selector`.
    #[must_use]
    pub fn text(self, path: impl Into<String>, selector: impl Into<String>) -> Self {
        self.entry(path, BindingEntry::Selector(selector.into()))
    }

    /// Bind `path` to one record.
    #[must_use]
    pub fn bind(self, path: impl Into<String>, record: ActionConfig) -> Self {
        self.entry(path, BindingEntry::Record(record))
    }

    /// Bind `path` to several records.
    #[must_use]
    pub fn bind_all(self, path: impl Into<String>, records: Vec<ActionConfig>) -> Self {
        self.entry(path, BindingEntry::List(records))
    }

    /// Look up the entry for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&BindingEntry> {
        self.entries.get(path)
    }

    /// Number of bound properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no property is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property paths in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for BindingConfig {
    type Item = (String, BindingEntry);
    type IntoIter = indexmap::map::IntoIter<String, BindingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<BindingEntry>> FromIterator<(K, V)> for BindingConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_selector_parses_as_text() {
        let config = BindingConfig::from_json_str(r#"{ "title": "h1" }"#).unwrap();
        let records = config.get("title").cloned().unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].selector.as_deref(), Some("h1"));
        assert_eq!(records[0].kind_or_default(), "text");
    }

    #[test]
    fn record_keeps_unknown_keys() {
        let config = BindingConfig::from_value(json!({
            "price": { "selector": ".price", "type": "currency", "code": "EUR" }
        }))
        .unwrap();
        let Some(BindingEntry::Record(record)) = config.get("price") else {
            panic!("expected record");
        };
        assert_eq!(record.kind.as_deref(), Some("currency"));
        assert_eq!(record.extra.get("code"), Some(&json!("EUR")));
    }

    #[test]
    fn list_fans_out_in_order() {
        let config = BindingConfig::from_value(json!({
            "title": [
                { "type": "text", "selector": "h1" },
                { "type": "text", "selector": "p" },
                { "type": "attr", "name": "title", "selector": "img" }
            ]
        }))
        .unwrap();
        let entry = config.get("title").unwrap();
        assert_eq!(entry.target_count(), 3);
        let selectors: Vec<_> = entry
            .clone()
            .into_records()
            .into_iter()
            .filter_map(|r| r.selector)
            .collect();
        assert_eq!(selectors, vec!["h1", "p", "img"]);
    }

    #[test]
    fn paths_keep_declaration_order() {
        let config = BindingConfig::from_json_str(r#"{ "z": "h1", "a": "p", "m": "img" }"#).unwrap();
        assert_eq!(config.paths().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn rebinding_replaces_in_place() {
        let config = BindingConfig::new()
            .text("a", "h1")
            .text("b", "p")
            .bind("a", ActionConfig::new("html").selector("h1"));
        assert_eq!(config.len(), 2);
        assert_eq!(config.paths().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(config.get("a"), Some(BindingEntry::Record(_))));
    }

    #[test]
    fn role_synthesizes_attribute_selector() {
        let record = ActionConfig::default().role("description");
        assert_eq!(
            record.target_selector().as_deref(),
            Some("[role=\"description\"]")
        );
        let both = ActionConfig::default().role("x").selector("h1");
        assert_eq!(both.target_selector().as_deref(), Some("h1"));
        assert_eq!(ActionConfig::default().target_selector(), None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(BindingConfig::from_json_str(r#"{ "title": 3 }"#).is_err());
        assert!(BindingConfig::from_json_str("[]").is_err());
    }

    #[test]
    fn collects_from_pairs() {
        let config: BindingConfig = [("title", "h1"), ("body", "p")].into_iter().collect();
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("body"), Some(&BindingEntry::from("p")));
    }

    #[test]
    fn serializes_back_to_the_same_shape() {
        let source = json!({
            "title": "h1",
            "flag": { "selector": "@", "type": "toggleClass", "yes": "on", "no": "off" }
        });
        let config = BindingConfig::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), source);
    }
}
