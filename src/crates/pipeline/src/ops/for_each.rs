//! Per-item pairing: `For_Each` and the transform-query family.
//!
//! Both yield `[item, result]` pairs so that an identifier is never separated
//! from the value computed for it.

use scene_query_primitives::{OptionSet, PrimitiveRef, QueryError, Result, Value};

use super::{ItemFn, IterMode, Iteration};
use crate::combinator::ConfigureRule;

pub(crate) fn pair_item(function: &ItemFn, item: Value) -> Result<Value> {
    let result = function.call(&item)?;
    Ok(Value::Array(vec![item, result]))
}

pub(crate) fn pair(function: &ItemFn, items: &[Value]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| pair_item(function, item.clone()))
        .collect()
}

/// One external call for `item`. An absent answer pairs with `null`.
pub(crate) fn query_item(primitive: &PrimitiveRef, item: Value, options: &OptionSet) -> Result<Value> {
    let answer = primitive
        .invoke(std::slice::from_ref(&item), options)
        .map_err(QueryError::from_primitive)?
        .map(Value::Array)
        .unwrap_or(Value::Null);
    Ok(Value::Array(vec![item, answer]))
}

pub(crate) fn query(primitive: &PrimitiveRef, items: &[Value], options: &OptionSet) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| query_item(primitive, item.clone(), options))
        .collect()
}

/// Space and mode flags a per-item query starts from: world space, absolute.
pub fn space_defaults() -> OptionSet {
    OptionSet::new().with("ws", true).with("a", true)
}

impl Iteration {
    /// `For_Each`: pairs each item with the transform's result.
    pub fn for_each(name: impl Into<String>) -> Self {
        Self::new(name, IterMode::ForEach)
            .with_rule(ConfigureRule::FunctionWithOptions(space_defaults()))
    }

    /// A per-item query against `primitive`, configured by its option set.
    pub fn transform_query(name: impl Into<String>, primitive: PrimitiveRef, defaults: OptionSet) -> Self {
        Self::new(name, IterMode::Query(primitive))
            .with_defaults(defaults)
            .with_rule(ConfigureRule::Update(space_defaults()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use scene_query_primitives::test_utils::{CallLog, RecordingPrimitive};

    use super::*;

    #[test]
    fn pairs_keep_the_identifier() -> anyhow::Result<()> {
        let len = ItemFn::new("len", |v| Ok(Value::from(v.as_str().map_or(0, str::len))));
        let out = pair(&len, &[json!("a"), json!("b")])?;
        assert_eq!(out, vec![json!(["a", 1]), json!(["b", 1])]);
        Ok(())
    }

    #[test]
    fn query_calls_once_per_item() -> anyhow::Result<()> {
        let log = CallLog::new();
        let xform = RecordingPrimitive::with("xform", &log, |args, _| {
            Ok(match args[0].as_str() {
                Some("pCube1") => Some(vec![json!(1.0), json!(2.0), json!(3.0)]),
                _ => None,
            })
        });
        let options = OptionSet::new().with("q", true).with("t", true);
        let out = query(&xform, &[json!("pCube1"), json!("ghost")], &options)?;
        assert_eq!(out, vec![json!(["pCube1", [1.0, 2.0, 3.0]]), json!(["ghost", null])]);

        let calls = log.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].args, vec![json!("ghost")]);
        assert_eq!(calls[0].options, options);
        Ok(())
    }
}
