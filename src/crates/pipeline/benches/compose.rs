use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use serde_json::json;

use scene_query_pipeline::{Call, Chainable, ItemFn, Iteration, Registry};
use scene_query_primitives::test_utils::{CallLog, RecordingPrimitive};
use scene_query_primitives::{OptionSet, Value};

fn registry(log: &CallLog) -> Arc<Registry> {
    let names: Vec<Value> = (0..1_000).map(|i| json!(format!("|grp|pCube{i}.vtx[{i}]"))).collect();
    let ls = RecordingPrimitive::returning("ls", log, names);
    let relatives = RecordingPrimitive::echo("listRelatives", log);

    let mut registry = Registry::new();
    registry
        .register(Chainable::new("Ls", ls.clone()).with_defaults(OptionSet::new().with("long", true)))
        .expect("fresh registry");
    registry
        .register(Chainable::new("Selection", ls).with_defaults(OptionSet::new().with("selection", true)))
        .expect("fresh registry");
    registry
        .register(Chainable::new("Relatives", relatives))
        .expect("fresh registry");
    registry.register(Iteration::filter("Where")).expect("fresh registry");
    registry.register(Iteration::indices("Indices")).expect("fresh registry");
    Arc::new(registry)
}

fn bench_build(c: &mut Criterion) {
    let log = CallLog::new();
    let registry = registry(&log);

    c.bench_function("build_five_stage_pipeline", |b| {
        b.iter(|| {
            registry
                .start("Ls")
                .and_then(|p| p.extend("Selection"))
                .and_then(|p| p.extend("Relatives"))
                .and_then(|p| p.extend("Where"))
                .and_then(|p| p.extend("Indices"))
                .expect("registered names")
        })
    });
}

fn bench_eval(c: &mut Criterion) {
    let log = CallLog::new();
    let registry = registry(&log);
    let even = ItemFn::predicate("even", |v| {
        v.as_str().is_some_and(|s| s.len() % 2 == 0)
    });

    c.bench_function("eval_fused_then_local", |b| {
        b.iter_batched(
            || {
                log.clear();
                registry
                    .start("Ls")
                    .and_then(|p| p.extend("Selection"))
                    .and_then(|p| p.call("Where", Call::new().function(even.clone())))
                    .and_then(|p| p.extend("Indices"))
                    .expect("registered names")
            },
            |pipeline| pipeline.eval().expect("well-formed components"),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build, bench_eval);
criterion_main!(benches);
