//! In-process iteration combinators.
//!
//! These kinds never fuse with anything. Their command is a local operator
//! that walks the upstream's materialized results once, in order:
//! - Filtering: `Where` (`filter`), `Where_Not` (`negate`)
//! - Mapping: `Iterate`, `Cast`, `Indices` (`map`)
//! - Pairing: `For_Each` and the transform-query family (`for_each`)

pub mod filter;
pub mod for_each;
pub mod map;
pub mod negate;

use std::fmt;
use std::sync::Arc;

use scene_query_primitives::{OptionSet, PrimitiveRef, Result, Value};

use crate::combinator::{Call, Combinator, ConfigureRule};
use crate::node::{Command, ExpressionNode};

pub use map::{component_index, parse_component_index};

type ItemFnInner = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// Results handed out one at a time. A per-item failure is yielded when the
/// iterator reaches that item.
pub type ValueIter<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

/// A labelled function applied to each item.
#[derive(Clone)]
pub struct ItemFn {
    label: Arc<str>,
    f: Arc<ItemFnInner>,
}

impl ItemFn {
    pub fn new<F>(label: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label),
            f: Arc::new(f),
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new("<fn>", f)
    }

    /// Adapts an infallible boolean test.
    pub fn predicate<F>(label: &str, p: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(label, move |v| Ok(Value::Bool(p(v))))
    }

    pub fn identity() -> Self {
        Self::new("identity", |v| Ok(v.clone()))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, item: &Value) -> Result<Value> {
        (self.f)(item)
    }
}

impl fmt::Debug for ItemFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemFn").field(&self.label).finish()
    }
}

/// Which walk a local operator performs.
#[derive(Debug, Clone)]
pub enum IterMode {
    Map,
    Filter,
    FilterNot,
    ForEach,
    /// Per-item call into the external engine.
    Query(PrimitiveRef),
}

/// The local command of an iteration node.
#[derive(Debug, Clone)]
pub struct LocalOp {
    mode: IterMode,
    function: ItemFn,
}

impl LocalOp {
    pub fn new(mode: IterMode, function: ItemFn) -> Self {
        Self { mode, function }
    }

    pub fn mode(&self) -> &IterMode {
        &self.mode
    }

    pub fn function(&self) -> &ItemFn {
        &self.function
    }

    pub fn label(&self) -> &str {
        match &self.mode {
            IterMode::Query(p) => p.name(),
            _ => self.function.label(),
        }
    }

    pub(crate) fn with_function(&self, function: ItemFn) -> Self {
        Self {
            mode: self.mode.clone(),
            function,
        }
    }

    /// Walks `items` lazily: each item's function or query runs when the
    /// iterator is advanced to it.
    pub fn stream<'a>(&'a self, items: Vec<Value>, options: &'a OptionSet) -> ValueIter<'a> {
        log::trace!("streaming {} over {} items", self.label(), items.len());
        let function = &self.function;
        let items = items.into_iter();
        match &self.mode {
            IterMode::Map => Box::new(items.map(move |item| function.call(&item))),
            IterMode::Filter => Box::new(items.filter_map(move |item| filter::keep_item(function, item))),
            IterMode::FilterNot => {
                Box::new(items.filter_map(move |item| negate::drop_item(function, item)))
            }
            IterMode::ForEach => Box::new(items.map(move |item| for_each::pair_item(function, item))),
            IterMode::Query(p) => {
                Box::new(items.map(move |item| for_each::query_item(p, item, options)))
            }
        }
    }

    /// Walks `items` once in order.
    pub fn run(&self, items: &[Value], options: &OptionSet) -> Result<Vec<Value>> {
        log::trace!("running {} over {} items", self.label(), items.len());
        match &self.mode {
            IterMode::Map => map::apply(&self.function, items),
            IterMode::Filter => filter::keep(&self.function, items),
            IterMode::FilterNot => negate::drop_matching(&self.function, items),
            IterMode::ForEach => for_each::pair(&self.function, items),
            IterMode::Query(p) => for_each::query(p, items, options),
        }
    }
}

/// Kind of every iteration combinator.
#[derive(Debug, Clone)]
pub struct Iteration {
    name: String,
    mode: IterMode,
    function: ItemFn,
    defaults: OptionSet,
    rule: ConfigureRule,
}

impl Iteration {
    /// Identity function, no defaults, configured by supplying a function.
    pub fn new(name: impl Into<String>, mode: IterMode) -> Self {
        Self {
            name: name.into(),
            mode,
            function: ItemFn::identity(),
            defaults: OptionSet::new(),
            rule: ConfigureRule::Function,
        }
    }

    pub fn with_function(mut self, function: ItemFn) -> Self {
        self.function = function;
        self
    }

    pub fn with_defaults(mut self, defaults: OptionSet) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_rule(mut self, rule: ConfigureRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn mode(&self) -> &IterMode {
        &self.mode
    }
}

impl Combinator for Iteration {
    fn name(&self) -> &str {
        &self.name
    }

    fn command(&self) -> Command {
        Command::Local(LocalOp::new(self.mode.clone(), self.function.clone()))
    }

    fn default_options(&self) -> OptionSet {
        self.defaults.clone()
    }

    fn configure(&self, node: &ExpressionNode, call: Call) -> Result<ExpressionNode> {
        self.rule.apply(&self.name, node, call)
    }
}
