//! Composition algebra for scene query pipelines.
//!
//! A pipeline is built by naming combinators one after another and is only
//! evaluated when asked. Two stages over the same primitive fuse into one
//! call; any other pair is separated by a full materialization of the
//! upstream results, which then become the downstream's arguments.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register(Chainable::new("Ls", ls.clone()).with_defaults(OptionSet::new().with("long", true)))?;
//! registry.register(Chainable::new("Selection", ls).with_defaults(OptionSet::new().with("selection", true)))?;
//! registry.register(Iteration::filter("Where"))?;
//! let registry = Arc::new(registry);
//!
//! // Nothing runs until eval() is called
//! let visible = registry
//!     .start("Ls")?
//!     .extend("Selection")?
//!     .call("Where", Call::new().function(is_visible))?;
//! let names = visible.eval()?;
//! ```

pub mod builder;
pub mod combinator;
pub mod expr;
pub mod node;
pub mod ops;
pub mod registry;

mod tests;

pub use builder::Pipeline;
pub use combinator::{Call, Chainable, Combinator, ConfigureRule, Unchainable};
pub use expr::{Chained, Disjoint, Expression, FusedCall};
pub use node::{Command, ExpressionNode};
pub use ops::{ItemFn, IterMode, Iteration, LocalOp, ValueIter};
pub use registry::Registry;
