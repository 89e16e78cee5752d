//! Negated filter for the pipeline DSL.
//!
//! The inverse of `Where`: keeps the items the predicate rejects.

use scene_query_primitives::{Result, Value, is_truthy};

use super::{ItemFn, IterMode, Iteration};

pub(crate) fn drop_item(function: &ItemFn, item: Value) -> Option<Result<Value>> {
    match function.call(&item) {
        Ok(verdict) => (!is_truthy(&verdict)).then_some(Ok(item)),
        Err(e) => Some(Err(e)),
    }
}

pub(crate) fn drop_matching(function: &ItemFn, items: &[Value]) -> Result<Vec<Value>> {
    items
        .iter()
        .filter_map(|item| drop_item(function, item.clone()))
        .collect()
}

impl Iteration {
    /// `Where_Not`: keeps items for which the predicate fails.
    pub fn filter_not(name: impl Into<String>) -> Self {
        Self::new(name, IterMode::FilterNot)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::filter::keep;
    use super::*;

    #[test]
    fn partitions_with_filter() -> anyhow::Result<()> {
        let input: Vec<_> = ["pCube1", "pSphere1", "pCube2", "persp", "pCube1"]
            .into_iter()
            .map(|s| json!(s))
            .collect();
        let is_cube = ItemFn::predicate("is_cube", |v| {
            v.as_str().is_some_and(|s| s.starts_with("pCube"))
        });

        let yes = keep(&is_cube, &input)?;
        let no = drop_matching(&is_cube, &input)?;

        assert_eq!(yes.len() + no.len(), input.len());
        assert!(yes.iter().all(|v| !no.contains(v)));
        let mut rebuilt: Vec<String> = yes.iter().chain(&no).map(|v| v.to_string()).collect();
        let mut expected: Vec<String> = input.iter().map(|v| v.to_string()).collect();
        rebuilt.sort();
        expected.sort();
        assert_eq!(rebuilt, expected);
        Ok(())
    }
}
