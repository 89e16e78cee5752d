//! Combinator kinds and the chaining rule.
//!
//! A [`Combinator`] is a named kind of node. It decides what command its nodes
//! run, which defaults they start with, whether they can fuse with the next
//! stage, and how call-style parameters reconfigure them.

use std::fmt;

use scene_query_primitives::{OptionSet, PositionalArgs, PrimitiveRef, QueryError, Result, Value};

use crate::node::{Command, ExpressionNode};
use crate::ops::ItemFn;

/// Core trait for combinator kinds.
///
/// Implement this to add a kind without touching the composition code.
///
/// ```ignore
/// struct Meshes(PrimitiveRef);
///
/// impl Combinator for Meshes {
///     fn name(&self) -> &str { "Meshes" }
///     fn command(&self) -> Command { Command::External(self.0.clone()) }
///     fn default_options(&self) -> OptionSet { OptionSet::new().with("type", "mesh") }
///     fn chainable(&self) -> bool { true }
/// }
/// ```
pub trait Combinator: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// The command a fresh node of this kind runs.
    fn command(&self) -> Command;

    fn default_options(&self) -> OptionSet {
        OptionSet::new()
    }

    fn chainable(&self) -> bool {
        false
    }

    /// Whether a node of this kind, as upstream, fuses with a `downstream`
    /// node into one call.
    ///
    /// Both kinds must be chainable and address the same primitive instance.
    /// Override to opt out for primitives whose options cannot be merged.
    fn can_chain(&self, downstream: &dyn Combinator) -> bool {
        self.chainable()
            && downstream.chainable()
            && self.command().same_primitive(&downstream.command())
    }

    /// Returns `node` reconfigured with call-style parameters.
    fn configure(&self, node: &ExpressionNode, call: Call) -> Result<ExpressionNode> {
        ConfigureRule::Replace.apply(self.name(), node, call)
    }
}

/// Call-style parameters supplied after a combinator name.
#[derive(Clone, Default)]
pub struct Call {
    pub args: PositionalArgs,
    pub options: OptionSet,
    pub function: Option<ItemFn>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn options(mut self, options: &OptionSet) -> Self {
        self.options.extend(options);
        self
    }

    pub fn function(mut self, function: ItemFn) -> Self {
        self.function = Some(function);
        self
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("args", &self.args)
            .field("options", &self.options)
            .field("function", &self.function.as_ref().map(ItemFn::label))
            .finish()
    }
}

/// How call-style parameters reshape a node.
#[derive(Debug, Clone)]
pub enum ConfigureRule {
    /// Args and options are replaced wholesale.
    Replace,
    /// Positional args become one list-valued option; args are kept.
    ArgsAsOption(String),
    /// Options become current, then defaults, then call options.
    Update(OptionSet),
    /// The call's function replaces the item function.
    Function,
    /// Function replaced, options become defaults overridden by call options.
    FunctionWithOptions(OptionSet),
}

impl ConfigureRule {
    pub fn apply(&self, combinator: &str, node: &ExpressionNode, call: Call) -> Result<ExpressionNode> {
        let Call {
            args,
            options,
            function,
        } = call;
        match self {
            ConfigureRule::Replace => {
                reject_function(combinator, &function)?;
                Ok(node.rebind(args, options))
            }
            ConfigureRule::ArgsAsOption(key) => {
                reject_function(combinator, &function)?;
                reject_options(combinator, &options)?;
                let options = node.options().clone().with(key.as_str(), Value::Array(args));
                Ok(node.rebind(node.args().to_vec(), options))
            }
            ConfigureRule::Update(defaults) => {
                reject_function(combinator, &function)?;
                reject_args(combinator, &args)?;
                let mut merged = node.options().clone();
                merged.extend(defaults);
                merged.extend(&options);
                Ok(node.rebind(node.args().to_vec(), merged))
            }
            ConfigureRule::Function => {
                reject_args(combinator, &args)?;
                reject_options(combinator, &options)?;
                node.with_function(require_function(combinator, function)?)
            }
            ConfigureRule::FunctionWithOptions(defaults) => {
                reject_args(combinator, &args)?;
                let configured = node.with_function(require_function(combinator, function)?)?;
                Ok(configured.rebind(configured.args().to_vec(), defaults.merged(&options)))
            }
        }
    }
}

fn reject_function(combinator: &str, function: &Option<ItemFn>) -> Result<()> {
    match function {
        Some(_) => Err(QueryError::invalid_call(combinator, "does not take a function")),
        None => Ok(()),
    }
}

fn reject_args(combinator: &str, args: &[Value]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(QueryError::invalid_call(
            combinator,
            format!("does not take positional arguments, got {}", args.len()),
        ))
    }
}

fn reject_options(combinator: &str, options: &OptionSet) -> Result<()> {
    if options.is_empty() {
        Ok(())
    } else {
        Err(QueryError::invalid_call(combinator, "does not take options"))
    }
}

fn require_function(combinator: &str, function: Option<ItemFn>) -> Result<ItemFn> {
    function.ok_or_else(|| QueryError::invalid_call(combinator, "expects a function"))
}

/// A kind that fuses with other chainable kinds over the same primitive.
#[derive(Debug, Clone)]
pub struct Chainable {
    name: String,
    primitive: PrimitiveRef,
    defaults: OptionSet,
    rule: ConfigureRule,
}

impl Chainable {
    pub fn new(name: impl Into<String>, primitive: PrimitiveRef) -> Self {
        Self {
            name: name.into(),
            primitive,
            defaults: OptionSet::new(),
            rule: ConfigureRule::Replace,
        }
    }

    pub fn with_defaults(mut self, defaults: OptionSet) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_rule(mut self, rule: ConfigureRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn primitive(&self) -> &PrimitiveRef {
        &self.primitive
    }
}

impl Combinator for Chainable {
    fn name(&self) -> &str {
        &self.name
    }

    fn command(&self) -> Command {
        Command::External(self.primitive.clone())
    }

    fn default_options(&self) -> OptionSet {
        self.defaults.clone()
    }

    fn chainable(&self) -> bool {
        true
    }

    fn configure(&self, node: &ExpressionNode, call: Call) -> Result<ExpressionNode> {
        self.rule.apply(&self.name, node, call)
    }
}

/// A kind that always composes disjointly, for primitives whose options
/// cannot be merged safely.
#[derive(Debug, Clone)]
pub struct Unchainable {
    name: String,
    primitive: PrimitiveRef,
    defaults: OptionSet,
    rule: ConfigureRule,
}

impl Unchainable {
    pub fn new(name: impl Into<String>, primitive: PrimitiveRef) -> Self {
        Self {
            name: name.into(),
            primitive,
            defaults: OptionSet::new(),
            rule: ConfigureRule::Replace,
        }
    }

    pub fn with_defaults(mut self, defaults: OptionSet) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_rule(mut self, rule: ConfigureRule) -> Self {
        self.rule = rule;
        self
    }
}

impl Combinator for Unchainable {
    fn name(&self) -> &str {
        &self.name
    }

    fn command(&self) -> Command {
        Command::External(self.primitive.clone())
    }

    fn default_options(&self) -> OptionSet {
        self.defaults.clone()
    }

    fn configure(&self, node: &ExpressionNode, call: Call) -> Result<ExpressionNode> {
        self.rule.apply(&self.name, node, call)
    }
}
