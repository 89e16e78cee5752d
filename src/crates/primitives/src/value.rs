//! Value types carried through a query pipeline.
//!
//! Everything a primitive receives or produces is a [`Value`]: node names are
//! strings, literals are JSON scalars, positions and matrices are arrays.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use serde_json::Value;

/// Ordered positional arguments of a call. Concatenation keeps upstream first.
pub type PositionalArgs = Vec<Value>;

/// Named options attached to a call.
///
/// Semantically unordered with unique keys. The backing map is ordered only so
/// that rendered expressions are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, Value>);

impl OptionSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reads a flag, treating a missing key as `default`.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.0.get(key).map(is_truthy).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns `self` overridden by `later`. On a key collision `later` wins.
    pub fn merged(&self, later: &OptionSet) -> OptionSet {
        let mut acc = self.clone();
        acc.extend(later);
        acc
    }

    /// Overrides entries of `self` with those of `later`.
    pub fn extend(&mut self, later: &OptionSet) {
        for (k, v) in later.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// Truthiness used by filters: null, false, zero, and empty strings,
/// arrays or objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Renders positional arguments as a bracketed, comma-separated list.
pub fn format_args(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_is_right_biased() {
        let up = OptionSet::new().with("x", 1).with("long", true);
        let down = OptionSet::new().with("x", 2);
        let merged = up.merged(&down);
        assert_eq!(merged.get("x"), Some(&json!(2)));
        assert_eq!(merged.get("long"), Some(&json!(true)));
        // inputs are untouched
        assert_eq!(up.get("x"), Some(&json!(1)));
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be false");
        }
        for truthy in [json!(true), json!(3), json!("a"), json!([0]), json!({"k": 0})] {
            assert!(is_truthy(&truthy), "{truthy} should be true");
        }
    }

    #[test]
    fn options_deserialize_from_json() {
        let opts: OptionSet = serde_json::from_str(r#"{"long": true, "type": ["mesh"]}"#).unwrap();
        assert!(opts.flag("long", false));
        assert!(!opts.flag("selection", false));
        assert_eq!(opts.get("type"), Some(&json!(["mesh"])));
    }

    #[test]
    fn display_is_stable() {
        let opts = OptionSet::new().with("b", 2).with("a", true);
        assert_eq!(opts.to_string(), r#"{"a": true, "b": 2}"#);
        assert_eq!(format_args(&[json!("pCube1"), json!(3)]), r#"["pCube1", 3]"#);
    }
}
