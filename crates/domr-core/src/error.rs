#![forbid(unsafe_code)]

//! Errors raised while rendering a binding.
//!
//! Both variants are configuration mistakes. They are returned synchronously
//! from `render` and never retried. Missing model data is not an error, and
//! neither is rendering a destroyed binding.

use std::fmt;

/// Errors from binding render/dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A selector (or synthesized role selector) matched no element.
    Lookup {
        /// The selector that was resolved.
        selector: String,
        /// Outer markup of the binding root, for context.
        root: String,
    },
    /// A record names an action type the registry does not know.
    Config {
        /// The unknown type name.
        kind: String,
    },
}

impl BindError {
    /// Whether this is a [`BindError::Lookup`].
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }

    /// Whether this is a [`BindError::Config`].
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { selector, root } => {
                write!(f, "can't find element with selector \"{selector}\" inside {root}")
            }
            Self::Config { kind } => write!(f, "invalid [type]: \"{kind}\""),
        }
    }
}

impl std::error::Error for BindError {}
