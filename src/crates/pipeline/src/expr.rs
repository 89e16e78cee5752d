//! Composition of pipeline stages.
//!
//! A pipeline is a left-leaning binary tree. Every inner vertex is one of two
//! compositions of an upstream expression with a downstream node:
//!
//! - [`Chained`]: both stages address the same primitive, so they fuse into a
//!   single call with concatenated args and right-biased merged options.
//! - [`Disjoint`]: the upstream is evaluated in full and its results become the
//!   downstream's positional arguments.
//!
//! Callers normally never pick a strategy; [`Expression::compose`] asks the
//! kinds involved.

use std::fmt;

use scene_query_primitives::{OptionSet, QueryError, Result, Value, format_args};

use crate::combinator::Call;
use crate::node::{Command, ExpressionNode, format_call};
use crate::ops::ValueIter;

/// A whole pipeline, or any subtree of one.
#[derive(Clone, Debug)]
pub enum Expression {
    Node(ExpressionNode),
    Chained(Box<Chained>),
    Disjoint(Box<Disjoint>),
}

/// Two stages fused into one deferred call.
#[derive(Clone, Debug)]
pub struct Chained {
    upstream: Expression,
    downstream: ExpressionNode,
}

/// Two stages separated by a full materialization of the upstream.
#[derive(Clone, Debug)]
pub struct Disjoint {
    upstream: Expression,
    downstream: ExpressionNode,
}

/// The single call a fusable expression stands for.
pub struct FusedCall<'a> {
    pub command: &'a Command,
    pub args: Vec<Value>,
    pub options: OptionSet,
}

impl Chained {
    /// Fuses `downstream` onto `upstream`.
    ///
    /// Fails if the upstream has no fused view (it ends in a disjoint edge) or
    /// addresses a different primitive instance.
    pub fn new(upstream: Expression, downstream: ExpressionNode) -> Result<Self> {
        let compatible = upstream
            .fused()
            .is_some_and(|call| call.command.same_primitive(downstream.command()));
        if !compatible {
            return Err(QueryError::IncompatibleComposition {
                upstream: upstream.tail().name().to_owned(),
                downstream: downstream.name().to_owned(),
            });
        }
        Ok(Self {
            upstream,
            downstream,
        })
    }

    pub fn upstream(&self) -> &Expression {
        &self.upstream
    }

    pub fn downstream(&self) -> &ExpressionNode {
        &self.downstream
    }

    /// Args are upstream first; options are merged with downstream winning.
    pub fn fused(&self) -> Option<FusedCall<'_>> {
        let up = self.upstream.fused()?;
        let mut args = up.args;
        args.extend_from_slice(self.downstream.args());
        Some(FusedCall {
            command: self.downstream.command(),
            args,
            options: up.options.merged(self.downstream.options()),
        })
    }

    /// Invokes the downstream command exactly once with the fused call.
    pub fn evaluate(&self) -> Result<Vec<Value>> {
        let call = self.fused().ok_or_else(|| QueryError::IncompatibleComposition {
            upstream: self.upstream.tail().name().to_owned(),
            downstream: self.downstream.name().to_owned(),
        })?;
        call.command.invoke(&call.args, &call.options)
    }
}

impl Disjoint {
    pub fn new(upstream: Expression, downstream: ExpressionNode) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    pub fn upstream(&self) -> &Expression {
        &self.upstream
    }

    pub fn downstream(&self) -> &ExpressionNode {
        &self.downstream
    }

    /// The downstream's own captured args are not used here.
    pub fn evaluate(&self) -> Result<Vec<Value>> {
        let inputs = self.upstream.evaluate()?;
        self.downstream
            .command()
            .invoke(&inputs, self.downstream.options())
    }

    /// Materializes the upstream, then hands a local downstream's results
    /// out one item at a time.
    pub fn iterate(&self) -> Result<ValueIter<'_>> {
        let inputs = self.upstream.evaluate()?;
        let options = self.downstream.options();
        match self.downstream.command() {
            Command::Local(op) => Ok(op.stream(inputs, options)),
            external => Ok(Box::new(external.invoke(&inputs, options)?.into_iter().map(Ok))),
        }
    }
}

impl Expression {
    /// Direct construction of a chained composition.
    pub fn chained(upstream: Expression, downstream: ExpressionNode) -> Result<Expression> {
        Ok(Expression::Chained(Box::new(Chained::new(upstream, downstream)?)))
    }

    pub fn disjoint(upstream: Expression, downstream: ExpressionNode) -> Expression {
        Expression::Disjoint(Box::new(Disjoint::new(upstream, downstream)))
    }

    /// Composes `next` onto this expression, picking the strategy.
    ///
    /// Only a plain node asks its kind whether it can chain with `next`. Any
    /// composition, chained or disjoint, is materialized before `next` runs,
    /// so `next` receives the composition's results as its arguments.
    pub fn compose(self, next: ExpressionNode) -> Expression {
        let fusable = match &self {
            Expression::Node(node) => node.kind().can_chain(next.kind().as_ref()),
            Expression::Chained(_) | Expression::Disjoint(_) => false,
        };
        if fusable {
            log::debug!("chaining {} onto {}", next.name(), self.tail().name());
            Expression::Chained(Box::new(Chained {
                upstream: self,
                downstream: next,
            }))
        } else {
            log::debug!("disjoint edge from {} to {}", self.tail().name(), next.name());
            Expression::disjoint(self, next)
        }
    }

    /// The most downstream node.
    pub fn tail(&self) -> &ExpressionNode {
        match self {
            Expression::Node(node) => node,
            Expression::Chained(c) => &c.downstream,
            Expression::Disjoint(d) => &d.downstream,
        }
    }

    /// Reconfigures the most downstream node, keeping the tree shape.
    pub fn configure(self, call: Call) -> Result<Expression> {
        Ok(match self {
            Expression::Node(node) => Expression::Node(node.configure(call)?),
            Expression::Chained(c) => {
                let Chained {
                    upstream,
                    downstream,
                } = *c;
                Expression::Chained(Box::new(Chained {
                    upstream,
                    downstream: downstream.configure(call)?,
                }))
            }
            Expression::Disjoint(d) => {
                let Disjoint {
                    upstream,
                    downstream,
                } = *d;
                Expression::disjoint(upstream, downstream.configure(call)?)
            }
        })
    }

    /// The fused call, if this expression stands for exactly one call.
    pub fn fused(&self) -> Option<FusedCall<'_>> {
        match self {
            Expression::Node(node) => Some(FusedCall {
                command: node.command(),
                args: node.args().to_vec(),
                options: node.options().clone(),
            }),
            Expression::Chained(c) => c.fused(),
            Expression::Disjoint(_) => None,
        }
    }

    /// Evaluates the tree bottom-up. Nothing is cached between calls.
    pub fn evaluate(&self) -> Result<Vec<Value>> {
        match self {
            Expression::Node(node) => node.evaluate(),
            Expression::Chained(c) => c.evaluate(),
            Expression::Disjoint(d) => d.evaluate(),
        }
    }

    /// Like [`Expression::evaluate`], but a trailing local operator yields
    /// its items, and any per-item failure, lazily.
    pub fn iterate(&self) -> Result<ValueIter<'_>> {
        match self {
            Expression::Node(node) => node.iterate(),
            Expression::Chained(c) => Ok(Box::new(c.evaluate()?.into_iter().map(Ok))),
            Expression::Disjoint(d) => d.iterate(),
        }
    }

    /// Number of external or local calls one evaluation makes, not counting
    /// per-item queries.
    pub fn call_count(&self) -> usize {
        match self {
            Expression::Node(_) | Expression::Chained(_) => 1,
            Expression::Disjoint(d) => d.upstream.call_count() + 1,
        }
    }
}

impl From<ExpressionNode> for Expression {
    fn from(node: ExpressionNode) -> Self {
        Expression::Node(node)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Node(node) => write!(f, "{}", node),
            Expression::Chained(c) => match c.fused() {
                Some(call) => {
                    let args = if call.args.is_empty() {
                        String::new()
                    } else {
                        format_args(&call.args)
                    };
                    f.write_str(&format_call(call.command.name(), &args, &call.options))
                }
                None => write!(f, "{}", c.downstream),
            },
            Expression::Disjoint(d) => f.write_str(&format_call(
                d.downstream.command().name(),
                &format!("[{}]", d.upstream),
                d.downstream.options(),
            )),
        }
    }
}
