//! Pipeline scenarios across registry, builder and compositions.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use scene_query_primitives::test_utils::{CallLog, RecordingPrimitive};
    use scene_query_primitives::{OptionSet, QueryError, Result, Value};

    use crate::{Call, Chainable, Expression, ItemFn, Iteration, Pipeline, Registry, Unchainable};

    /// KindA is chainable over `p`, KindB is unchainable over `q`.
    fn fixture(log: &CallLog) -> anyhow::Result<Arc<Registry>> {
        let p = RecordingPrimitive::returning("P", log, vec![json!("n1"), json!("n2")]);
        let q = RecordingPrimitive::echo("Q", log);
        let mut registry = Registry::new();
        registry.register(
            Chainable::new("KindA", p).with_defaults(OptionSet::new().with("long", true)),
        )?;
        registry.register(Unchainable::new("KindB", q).with_defaults(OptionSet::new().with("b", 1)))?;
        registry.register(Iteration::filter("Where"))?;
        registry.register(Iteration::filter_not("Where_Not"))?;
        registry.register(Iteration::map("Cast"))?;
        registry.register(Iteration::for_each("For_Each"))?;
        Ok(Arc::new(registry))
    }

    #[test]
    fn end_to_end_fuse_then_materialize() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;

        let fused = registry
            .start("KindA")?
            .call("KindA", Call::new().option("selection", true))?;
        assert!(matches!(fused.expression(), Expression::Chained(_)));
        assert!(log.is_empty(), "building never evaluates");

        fused.eval()?;
        let calls = log.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].options,
            OptionSet::new().with("long", true).with("selection", true)
        );
        log.clear();

        let full = fused.extend("KindB")?;
        assert!(matches!(full.expression(), Expression::Disjoint(_)));
        assert_eq!(full.eval()?, vec![json!("n1"), json!("n2")]);
        let calls = log.calls();
        assert_eq!(log.names(), vec!["P", "Q"]);
        assert_eq!(calls[1].args, vec![json!("n1"), json!("n2")]);
        assert_eq!(calls[1].options, OptionSet::new().with("b", 1));
        Ok(())
    }

    #[test]
    fn unknown_combinator_surfaces_immediately() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let err = registry.start("KindA")?.extend("KindZ").unwrap_err();
        assert!(matches!(err, QueryError::UnknownCombinator(ref n) if n == "KindZ"));
        assert!(log.is_empty());
        Ok(())
    }

    #[test]
    fn configure_returns_a_new_pipeline() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let base = registry.start("KindA")?;
        let configured = base.clone().configure(Call::new().arg("pCube1"))?;

        base.eval()?;
        configured.eval()?;
        let calls = log.calls();
        assert!(calls[0].args.is_empty());
        assert_eq!(calls[1].args, vec![json!("pCube1")]);
        // wholesale replacement drops the default option
        assert!(calls[1].options.is_empty());
        Ok(())
    }

    #[test]
    fn filter_and_negate_partition_results() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let is_first = ItemFn::predicate("is_n1", |v| v == &json!("n1"));

        let kept = registry
            .start("KindA")?
            .call("Where", Call::new().function(is_first.clone()))?
            .eval()?;
        let dropped = registry
            .start("KindA")?
            .call("Where_Not", Call::new().function(is_first))?
            .eval()?;
        assert_eq!(kept, vec![json!("n1")]);
        assert_eq!(dropped, vec![json!("n2")]);
        Ok(())
    }

    #[test]
    fn iteration_stages_chain_disjointly() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let suffix = ItemFn::new("suffix", |v| {
            Ok(Value::from(format!("{}Shape", v.as_str().unwrap_or_default())))
        });
        let len = ItemFn::new("len", |v| Ok(Value::from(v.as_str().map_or(0, str::len))));

        let pipeline = registry
            .start("KindA")?
            .call("Cast", Call::new().function(suffix))?
            .call("For_Each", Call::new().function(len).option("ws", false))?;
        assert_eq!(pipeline.expression().call_count(), 3);
        assert_eq!(
            pipeline.eval()?,
            vec![json!(["n1Shape", 7]), json!(["n2Shape", 7])]
        );
        assert_eq!(
            pipeline.expression().tail().options(),
            &OptionSet::new().with("ws", false).with("a", true)
        );
        assert_eq!(log.len(), 1, "local stages never reach the engine");
        Ok(())
    }

    #[test]
    fn iteration_rejects_positional_args() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let err = registry
            .start("KindA")?
            .call("Where", Call::new().arg(1))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidCall { ref combinator, .. } if combinator == "Where"));
        let err = registry.start("KindA")?.call("Cast", Call::new()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidCall { .. }));
        Ok(())
    }

    #[test]
    fn empty_results_flow_through() -> anyhow::Result<()> {
        let log = CallLog::new();
        let nothing = RecordingPrimitive::absent("ls", &log);
        let mut registry = Registry::new();
        registry.register(Chainable::new("Ls", nothing))?;
        registry.register(Iteration::map("Cast"))?;
        let registry = Arc::new(registry);

        let out = registry.start("Ls")?.extend("Cast")?.eval()?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn iteration_failures_surface_per_item() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let only_n1 = ItemFn::new("only_n1", |v| match v.as_str() {
            Some("n1") => Ok(Value::from("ok")),
            _ => Err(QueryError::IndexParse(v.to_string())),
        });
        let pipeline = registry
            .start("KindA")?
            .call("Cast", Call::new().function(only_n1))?;

        let mut items = pipeline.iter()?;
        assert_eq!(log.len(), 1, "the engine call runs up front");
        assert_eq!(items.next().transpose()?, Some(json!("ok")));
        assert!(matches!(items.next(), Some(Err(QueryError::IndexParse(_)))));
        assert!(items.next().is_none());

        assert!(pipeline.eval().is_err());
        Ok(())
    }

    #[test]
    fn pipelines_wrap_hand_built_expressions() -> anyhow::Result<()> {
        let log = CallLog::new();
        let registry = fixture(&log)?;
        let tail = registry.extend(registry.instantiate("KindA")?.into(), "KindB")?;

        let pipeline = Pipeline::from_expression(&registry, tail).extend("Where")?;
        assert_eq!(pipeline.iter()?.collect::<Result<Vec<_>>>()?, vec![json!("n1"), json!("n2")]);
        assert_eq!(log.names(), vec!["P", "Q"]);

        let expression = pipeline.into_expression();
        assert_eq!(expression.tail().name(), "Where");
        assert_eq!(expression.call_count(), 3);
        Ok(())
    }
}
