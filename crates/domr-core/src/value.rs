#![forbid(unsafe_code)]

//! Display values and model-data lookup.
//!
//! Every bound value is normalized to a string before it is diffed or handed
//! to an action. [`DisplayValue`] makes that normalization explicit, together
//! with the string truthiness rule used by boolean actions.
//!
//! # Normalization
//!
//! | Model value | Display value |
//! |-------------|---------------|
//! | absent, `null`, NaN | `""` |
//! | string | unchanged |
//! | bool | `"true"` / `"false"` |
//! | integer up to 2^53 | decimal |
//! | other number | shortest round-trip digits laid out like JavaScript's `Number#toString`: `1.0` → `"1"`, `-0.0` → `"0"`, `1e21` → `"1e+21"`, `1e-7` → `"1e-7"` |
//! | array, object | compact JSON |

use std::fmt;

use serde_json::Value;

/// Largest integer a JSON number keeps exactly once it becomes an `f64`.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Normalized string form of a bound value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayValue(String);

impl DisplayValue {
    /// Wrap an already-normalized string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty display value.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Normalize a looked-up model value. `None` means "no value".
    #[must_use]
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::empty(),
            Some(Value::String(s)) => Self(s.clone()),
            Some(Value::Bool(b)) => Self(b.to_string()),
            Some(Value::Number(n)) => match n.as_i64().filter(|i| i.unsigned_abs() <= MAX_SAFE_INTEGER) {
                Some(i) => Self(i.to_string()),
                None => n.as_f64().map_or_else(Self::empty, Self::from_f64),
            },
            Some(composite @ (Value::Array(_) | Value::Object(_))) => Self(composite.to_string()),
        }
    }

    /// Normalize a float. NaN becomes `""`.
    #[must_use]
    pub fn from_f64(n: f64) -> Self {
        if n.is_nan() {
            Self::empty()
        } else if n == 0.0 {
            Self("0".to_owned())
        } else if n.is_infinite() {
            Self(if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned())
        } else {
            Self(js_number(n))
        }
    }

    /// Borrow the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the display value is `""`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String truthiness used by boolean actions.
    ///
    /// Truthy unless the value is exactly `"false"` or `""`. Note that `"0"`
    /// is truthy: values are already strings by the time actions see them.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !(self.0.is_empty() || self.0 == "false")
    }

    /// Whitespace-separated tokens, as used by class actions.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Consume into the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DisplayValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<f64> for DisplayValue {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl AsRef<str> for DisplayValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve a dotted property path (`"foo.bar.baz"`) inside model data.
///
/// Object segments are looked up by key and array segments by decimal index.
/// A missing key, an out-of-range index, or a scalar in an intermediate
/// position yields `None`; lookups never fail.
#[must_use]
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Lay out a finite, non-zero float the way `Number#toString` does:
/// positional between 1e-7 and 1e21, exponent form outside.
fn js_number(n: f64) -> String {
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exponent + 1;

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (point - k) as usize));
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-point) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&exponent.unsigned_abs().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn null_absent_and_nan_normalize_to_empty() {
        assert_eq!(DisplayValue::from_json(None), DisplayValue::empty());
        assert_eq!(DisplayValue::from_json(Some(&Value::Null)), DisplayValue::empty());
        assert_eq!(DisplayValue::from_f64(f64::NAN), DisplayValue::empty());
        // serde_json stores NaN as null.
        let data = json!({ "title": f64::NAN });
        assert_eq!(
            DisplayValue::from_json(lookup_path(&data, "title")),
            DisplayValue::empty()
        );
    }

    #[test]
    fn scalars_use_their_string_form() {
        assert_eq!(DisplayValue::from_json(Some(&json!("abc"))).as_str(), "abc");
        assert_eq!(DisplayValue::from_json(Some(&json!(true))).as_str(), "true");
        assert_eq!(DisplayValue::from_json(Some(&json!(false))).as_str(), "false");
        assert_eq!(DisplayValue::from_json(Some(&json!(42))).as_str(), "42");
        assert_eq!(DisplayValue::from_json(Some(&json!(-7))).as_str(), "-7");
        assert_eq!(DisplayValue::from_json(Some(&json!(1.0))).as_str(), "1");
        assert_eq!(DisplayValue::from_json(Some(&json!(0.5))).as_str(), "0.5");
        assert_eq!(DisplayValue::from_f64(-0.0).as_str(), "0");
        assert_eq!(DisplayValue::from_f64(f64::INFINITY).as_str(), "Infinity");
    }

    #[test]
    fn floats_switch_to_exponent_form_like_javascript() {
        let cases = [
            (1e21, "1e+21"),
            (1e20, "100000000000000000000"),
            (-1.5e300, "-1.5e+300"),
            (1e-7, "1e-7"),
            (1.25e-7, "1.25e-7"),
            (1e-6, "0.000001"),
            (123.456, "123.456"),
            (-0.001, "-0.001"),
        ];
        for (n, expected) in cases {
            assert_eq!(DisplayValue::from_f64(n).as_str(), expected, "{n:?}");
        }
        assert_eq!(
            DisplayValue::from_json(Some(&json!(u64::MAX))).as_str(),
            "18446744073709552000"
        );
        assert_eq!(
            DisplayValue::from_json(Some(&json!(9_007_199_254_740_991_i64))).as_str(),
            "9007199254740991"
        );
    }

    #[test]
    fn composites_become_compact_json() {
        assert_eq!(
            DisplayValue::from_json(Some(&json!([1, "a"]))).as_str(),
            r#"[1,"a"]"#
        );
        assert_eq!(
            DisplayValue::from_json(Some(&json!({ "k": 1 }))).as_str(),
            r#"{"k":1}"#
        );
    }

    #[test]
    fn truthiness_is_string_based() {
        assert!(!DisplayValue::from("false").is_truthy());
        assert!(!DisplayValue::from("").is_truthy());
        assert!(DisplayValue::from("0").is_truthy());
        assert!(DisplayValue::from("true").is_truthy());
        assert!(DisplayValue::from("FALSE").is_truthy());
        assert!(DisplayValue::from(" ").is_truthy());
    }

    #[test]
    fn tokens_split_on_any_whitespace() {
        let v = DisplayValue::from("  callout\tcallout-2 \n");
        assert_eq!(v.tokens().collect::<Vec<_>>(), vec!["callout", "callout-2"]);
        assert_eq!(DisplayValue::empty().tokens().count(), 0);
    }

    #[test]
    fn lookup_walks_nested_objects() {
        let data = json!({ "foo": { "bar": { "description": "dolor" } } });
        assert_eq!(
            lookup_path(&data, "foo.bar.description"),
            Some(&json!("dolor"))
        );
        assert_eq!(lookup_path(&data, "foo.missing.description"), None);
        assert_eq!(lookup_path(&data, "foo.bar.description.len"), None);
    }

    #[test]
    fn lookup_indexes_arrays() {
        let data = json!({ "items": [{ "name": "a" }, { "name": "b" }] });
        assert_eq!(lookup_path(&data, "items.1.name"), Some(&json!("b")));
        assert_eq!(lookup_path(&data, "items.9.name"), None);
        assert_eq!(lookup_path(&data, "items.x.name"), None);
    }

    #[test]
    fn lookup_through_null_yields_none() {
        let data = json!({ "foo": null });
        assert_eq!(lookup_path(&data, "foo.bar"), None);
        assert_eq!(lookup_path(&data, "foo"), Some(&Value::Null));
    }

    proptest! {
        #[test]
        fn strings_round_trip_unchanged(s in ".*") {
            let value = Value::String(s.clone());
            prop_assert_eq!(DisplayValue::from_json(Some(&value)).into_string(), s);
        }

        #[test]
        fn only_empty_and_false_are_falsy(s in ".*") {
            let expected = !(s.is_empty() || s == "false");
            prop_assert_eq!(DisplayValue::from(s.as_str()).is_truthy(), expected);
        }

        #[test]
        fn finite_floats_never_normalize_to_empty(n in proptest::num::f64::NORMAL) {
            prop_assert!(!DisplayValue::from_f64(n).is_empty());
        }
    }
}
