//! The standard combinator set.
//!
//! Node listing, relatives, component expansion and conversion, iteration
//! and transform queries, registered under the names pipelines use.

use std::sync::Arc;

use scene_query_pipeline::{Chainable, Combinator, ConfigureRule, Iteration, Registry, Unchainable};
use scene_query_primitives::{OptionSet, PrimitiveRef, Result};

use crate::components::{ComponentMarkers, ExpandPrimitive, mask};
use crate::scene::SceneCommands;

fn flags(keys: &[&str]) -> OptionSet {
    keys.iter().map(|k| (*k, true)).collect()
}

fn shared(kind: impl Combinator) -> Arc<dyn Combinator> {
    Arc::new(kind)
}

fn expand_defaults() -> OptionSet {
    OptionSet::new().with("force", false).with("expand", true)
}

fn listing(commands: &SceneCommands) -> Vec<Arc<dyn Combinator>> {
    let ls = &commands.ls;
    let relatives = &commands.list_relatives;
    vec![
        shared(Chainable::new("Ls", ls.clone()).with_defaults(flags(&["long"]))),
        shared(Chainable::new("Selection", ls.clone()).with_defaults(flags(&["long", "selection"]))),
        shared(
            Chainable::new("OfType", ls.clone())
                .with_defaults(flags(&["long"]))
                .with_rule(ConfigureRule::ArgsAsOption("type".into())),
        ),
        shared(Chainable::new("History", commands.list_history.clone())),
        shared(Chainable::new("Relatives", relatives.clone()).with_defaults(flags(&["fullPath"]))),
        shared(Chainable::new("Shapes", relatives.clone()).with_defaults(flags(&["fullPath", "shapes"]))),
        shared(Chainable::new("Parents", relatives.clone()).with_defaults(flags(&["fullPath", "parent"]))),
        shared(Chainable::new("FindType", commands.find_type.clone()).with_defaults(flags(&["deep"]))),
    ]
}

fn components(commands: &SceneCommands, markers: &ComponentMarkers) -> Vec<Arc<dyn Combinator>> {
    let expand = PrimitiveRef::new(ExpandPrimitive::new(
        commands.filter_expand.clone(),
        markers.clone(),
    ));
    let kind = |name: &str, selection_mask: Option<i64>| -> Arc<dyn Combinator> {
        let mut defaults = OptionSet::new();
        if let Some(m) = selection_mask {
            defaults.insert("selectionMask", m);
            defaults.insert("fullPath", true);
        }
        shared(
            Chainable::new(name, expand.clone())
                .with_defaults(defaults)
                .with_rule(ConfigureRule::Update(expand_defaults())),
        )
    };
    let convert = |name: &str, flag: Option<&str>| -> Arc<dyn Combinator> {
        let defaults = flag.map(|f| flags(&[f])).unwrap_or_default();
        shared(Unchainable::new(name, commands.convert_components.clone()).with_defaults(defaults))
    };
    vec![
        kind("Components", None),
        kind("Vertices", Some(mask::VERTICES)),
        kind("Edges", Some(mask::EDGES)),
        kind("Faces", Some(mask::FACES)),
        kind("UVs", Some(mask::UVS)),
        kind("VertexFaces", Some(mask::VERTEX_FACES)),
        kind("CVs", Some(mask::CVS)),
        kind("EPs", Some(mask::EPS)),
        convert("Convert", None),
        convert("AsFaces", Some("tf")),
        convert("AsVertices", Some("tv")),
        convert("AsEdges", Some("te")),
        convert("AsVertexFace", Some("tvf")),
    ]
}

fn iteration(commands: &SceneCommands) -> Vec<Arc<dyn Combinator>> {
    let query = |name: &str, extra: &[&str]| -> Arc<dyn Combinator> {
        let mut defaults = flags(&["q", "ws", "a"]);
        defaults.extend(&flags(extra));
        shared(Iteration::transform_query(name, commands.xform.clone(), defaults))
    };
    vec![
        shared(Iteration::map("Iterate")),
        shared(Iteration::filter("Where")),
        shared(Iteration::filter_not("Where_Not")),
        shared(Iteration::map("Cast")),
        shared(Iteration::indices("Indices")),
        shared(Iteration::for_each("For_Each")),
        query("Xform", &[]),
        query("Translations", &["t"]),
        query("Rotations", &["r"]),
        query("Scales", &["s"]),
        query("Pivots", &["piv"]),
        shared(Iteration::transform_query(
            "Matrices",
            commands.xform.clone(),
            flags(&["q", "ws", "matrix"]),
        )),
    ]
}

/// Every standard kind, in registration order.
pub fn standard_combinators(commands: &SceneCommands, markers: &ComponentMarkers) -> Vec<Arc<dyn Combinator>> {
    let mut all = listing(commands);
    all.extend(components(commands, markers));
    all.extend(iteration(commands));
    all
}

/// A registry holding the standard kinds.
pub fn standard_registry(commands: &SceneCommands, markers: &ComponentMarkers) -> Result<Registry> {
    let mut registry = Registry::new();
    for kind in standard_combinators(commands, markers) {
        registry.register_arc(kind)?;
    }
    log::debug!("standard registry holds {} combinators", registry.len());
    Ok(registry)
}
