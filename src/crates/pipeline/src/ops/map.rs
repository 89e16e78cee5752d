//! Mapping operations: `Iterate`, `Cast` and `Indices`.

use once_cell::sync::Lazy;
use regex::Regex;
use scene_query_primitives::{QueryError, Result, Value};

use super::{ItemFn, IterMode, Iteration};

static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d*)\]").expect("valid regex"));

pub(crate) fn apply(function: &ItemFn, items: &[Value]) -> Result<Vec<Value>> {
    items.iter().map(|item| function.call(item)).collect()
}

/// Parses the first `[<digits>]` group of a component identifier,
/// e.g. `pCube1.vtx[7]` is `7`.
pub fn parse_component_index(item: &str) -> Result<u64> {
    BRACKETS
        .captures(item)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .ok_or_else(|| QueryError::IndexParse(item.to_owned()))
}

/// [`parse_component_index`] over a value. Non-strings fail too.
pub fn component_index(item: &Value) -> Result<Value> {
    match item {
        Value::String(s) => Ok(Value::from(parse_component_index(s)?)),
        other => Err(QueryError::IndexParse(other.to_string())),
    }
}

impl Iteration {
    /// `Iterate` / `Cast`: applies a transform to every item.
    pub fn map(name: impl Into<String>) -> Self {
        Self::new(name, IterMode::Map)
    }

    /// `Indices`: a map whose default transform extracts component indices.
    pub fn indices(name: impl Into<String>) -> Self {
        Self::map(name).with_function(ItemFn::new("component_index", component_index))
    }
}
