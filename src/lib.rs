//! Fluent, lazily evaluated queries over a scene engine.
//!
//! `primitives` holds the shared data model, `pipeline` the composition
//! algebra and `commands` the standard combinator library.

pub use scene_query_commands as commands;
pub use scene_query_pipeline as pipeline;
pub use scene_query_primitives as primitives;

pub mod prelude {
    pub use scene_query_commands::{ComponentMarkers, SceneCommands, standard_registry};
    pub use scene_query_pipeline::{
        Call, Chainable, Combinator, ConfigureRule, Expression, ItemFn, Iteration, Pipeline, Registry,
        Unchainable,
    };
    pub use scene_query_primitives::{OptionSet, Primitive, PrimitiveRef, QueryError, Result, Value};
}
