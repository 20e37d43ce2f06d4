#![forbid(unsafe_code)]

//! Compound selector matching for the in-memory DOM.
//!
//! Grammar: `tag? ( '#' ident | '.' ident | '[' ident ( '=' value )? ']' )*`
//! where `value` is bare or quoted with `"` / `'`. `*` matches any tag.
//! Whitespace, combinators and pseudo-classes are rejected by [`Selector::parse`].

/// Parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Required tag name (lowercase); `None` matches any tag.
    pub tag: Option<String>,
    /// Required `id` values.
    pub ids: Vec<String>,
    /// Required class tokens.
    pub classes: Vec<String>,
    /// Required attributes, optionally with an exact value.
    pub attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parse a compound selector. Returns `None` for unsupported syntax.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Self::default();
        let mut rest = input;

        let tag_len = ident_len(rest);
        if tag_len > 0 {
            selector.tag = Some(rest[..tag_len].to_ascii_lowercase());
            rest = &rest[tag_len..];
        } else if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '#' | '.' => {
                    let body = &rest[1..];
                    let len = ident_len(body);
                    if len == 0 {
                        return None;
                    }
                    let ident = body[..len].to_owned();
                    if c == '#' {
                        selector.ids.push(ident);
                    } else {
                        selector.classes.push(ident);
                    }
                    rest = &body[len..];
                }
                '[' => {
                    let close = rest.find(']')?;
                    let inner = rest[1..close].trim();
                    rest = &rest[close + 1..];
                    selector.attributes.push(parse_attribute(inner)?);
                }
                _ => return None,
            }
        }

        Some(selector)
    }
}

fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map_or(s.len(), |(i, _)| i)
}

fn parse_attribute(inner: &str) -> Option<(String, Option<String>)> {
    let Some((name, value)) = inner.split_once('=') else {
        let len = ident_len(inner);
        return (len > 0 && len == inner.len()).then(|| (inner.to_owned(), None));
    };
    let name = name.trim();
    if name.is_empty() || ident_len(name) != name.len() {
        return None;
    }
    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value);
    Some((name.to_owned(), Some(unquoted.to_owned())))
}
