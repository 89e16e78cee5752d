//! The atomic, lazily evaluated unit of a pipeline.
//!
//! An [`ExpressionNode`] binds a [`Command`] to captured positional arguments
//! and an option set. Building one never runs anything; every call to
//! [`ExpressionNode::evaluate`] runs the command again.

use std::fmt;
use std::sync::Arc;

use scene_query_primitives::{
    OptionSet, PositionalArgs, PrimitiveRef, QueryError, Result, Value, format_args,
};

use crate::combinator::{Call, Combinator};
use crate::ops::{ItemFn, LocalOp, ValueIter};

/// What a node runs when evaluated.
#[derive(Clone, Debug)]
pub enum Command {
    /// A call into the external engine.
    External(PrimitiveRef),
    /// An in-process operator over already fetched results.
    Local(LocalOp),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::External(p) => p.name(),
            Command::Local(op) => op.label(),
        }
    }

    /// Identity check used by the chaining rule. Local operators never match.
    pub fn same_primitive(&self, other: &Command) -> bool {
        match (self, other) {
            (Command::External(a), Command::External(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn primitive(&self) -> Option<&PrimitiveRef> {
        match self {
            Command::External(p) => Some(p),
            Command::Local(_) => None,
        }
    }

    /// Runs the command once. An absent result becomes an empty sequence.
    pub fn invoke(&self, args: &[Value], options: &OptionSet) -> Result<Vec<Value>> {
        match self {
            Command::External(p) => p
                .invoke(args, options)
                .map(Option::unwrap_or_default)
                .map_err(QueryError::from_primitive),
            Command::Local(op) => op.run(args, options),
        }
    }
}

/// A command with its captured call payload.
#[derive(Clone)]
pub struct ExpressionNode {
    kind: Arc<dyn Combinator>,
    command: Command,
    args: PositionalArgs,
    options: OptionSet,
}

impl ExpressionNode {
    pub fn new(kind: Arc<dyn Combinator>, args: PositionalArgs, options: OptionSet) -> Self {
        let command = kind.command();
        Self {
            kind,
            command,
            args,
            options,
        }
    }

    /// A node of `kind` carrying the kind's declared defaults.
    pub fn instantiate(kind: &Arc<dyn Combinator>) -> Self {
        Self::new(Arc::clone(kind), Vec::new(), kind.default_options())
    }

    pub fn kind(&self) -> &Arc<dyn Combinator> {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn evaluate(&self) -> Result<Vec<Value>> {
        self.command.invoke(&self.args, &self.options)
    }

    /// Results one at a time over a fresh evaluation.
    ///
    /// An external command runs in full before this returns. A local
    /// operator's per-item work runs as the iterator advances.
    pub fn iterate(&self) -> Result<ValueIter<'_>> {
        match &self.command {
            Command::Local(op) => Ok(op.stream(self.args.clone(), &self.options)),
            Command::External(_) => Ok(Box::new(self.evaluate()?.into_iter().map(Ok))),
        }
    }

    /// Same command, new payload. Nothing from the old payload survives.
    pub fn rebind(&self, args: PositionalArgs, options: OptionSet) -> Self {
        Self {
            kind: Arc::clone(&self.kind),
            command: self.command.clone(),
            args,
            options,
        }
    }

    /// Applies call-style parameters through the node's kind.
    pub fn configure(&self, call: Call) -> Result<Self> {
        self.kind.configure(self, call)
    }

    pub(crate) fn with_function(&self, function: ItemFn) -> Result<Self> {
        let command = match &self.command {
            Command::Local(op) => Command::Local(op.with_function(function)),
            Command::External(_) => {
                return Err(QueryError::invalid_call(
                    self.name(),
                    "only iteration combinators take a function",
                ));
            }
        };
        Ok(Self {
            kind: Arc::clone(&self.kind),
            command,
            args: self.args.clone(),
            options: self.options.clone(),
        })
    }
}

pub(crate) fn format_call(command: &str, args: &str, options: &OptionSet) -> String {
    let mut parts = Vec::new();
    if !args.is_empty() {
        parts.push(format!("\n\t*{}", args));
    }
    if !options.is_empty() {
        parts.push(format!("\n\t**{}", options));
    }
    format!("{}({})", command, parts.join(","))
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = if self.args.is_empty() {
            String::new()
        } else {
            format_args(&self.args)
        };
        f.write_str(&format_call(self.command.name(), &args, &self.options))
    }
}

impl fmt::Debug for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionNode")
            .field("kind", &self.kind.name())
            .field("command", &self.command.name())
            .field("args", &self.args)
            .field("options", &self.options)
            .finish()
    }
}
