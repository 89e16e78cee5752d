//! Filter operation for the pipeline DSL.

use scene_query_primitives::{Result, Value, is_truthy};

use super::{ItemFn, IterMode, Iteration};

/// `Some(item)` when the function's result for it is truthy.
pub(crate) fn keep_item(function: &ItemFn, item: Value) -> Option<Result<Value>> {
    match function.call(&item) {
        Ok(verdict) => is_truthy(&verdict).then_some(Ok(item)),
        Err(e) => Some(Err(e)),
    }
}

/// Keeps items whose function result is truthy.
pub(crate) fn keep(function: &ItemFn, items: &[Value]) -> Result<Vec<Value>> {
    items
        .iter()
        .filter_map(|item| keep_item(function, item.clone()))
        .collect()
}

impl Iteration {
    /// `Where`: keeps items for which the predicate holds.
    pub fn filter(name: impl Into<String>) -> Self {
        Self::new(name, IterMode::Filter)
    }
}
