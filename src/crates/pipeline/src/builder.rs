//! Fluent pipeline construction.
//!
//! `Pipeline` is what callers hold while building. Each step consumes the
//! pipeline and returns a new one, so a built tree is never edited in place.
//!
//! ```ignore
//! let shapes = registry
//!     .start("Selection")?
//!     .call("OfType", Call::new().arg("transform"))?
//!     .extend("Shapes")?;
//! for shape in shapes.iter()? {
//!     let shape = shape?;
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use scene_query_primitives::{Result, Value};

use crate::combinator::Call;
use crate::expr::Expression;
use crate::ops::ValueIter;
use crate::registry::Registry;

#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<Registry>,
    tail: Expression,
}

impl Pipeline {
    /// A pipeline whose root is a fresh node of the named kind.
    pub fn start(registry: &Arc<Registry>, name: &str) -> Result<Self> {
        let root = registry.instantiate(name)?;
        Ok(Self {
            registry: Arc::clone(registry),
            tail: Expression::Node(root),
        })
    }

    pub fn from_expression(registry: &Arc<Registry>, tail: Expression) -> Self {
        Self {
            registry: Arc::clone(registry),
            tail,
        }
    }

    /// Extends by name with the kind's defaults.
    pub fn extend(self, name: &str) -> Result<Self> {
        let tail = self.registry.extend(self.tail, name)?;
        Ok(Self {
            registry: self.registry,
            tail,
        })
    }

    /// Applies call-style parameters to the last stage.
    pub fn configure(self, call: Call) -> Result<Self> {
        Ok(Self {
            tail: self.tail.configure(call)?,
            registry: self.registry,
        })
    }

    /// `extend` followed by `configure`.
    pub fn call(self, name: &str, call: Call) -> Result<Self> {
        self.extend(name)?.configure(call)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn expression(&self) -> &Expression {
        &self.tail
    }

    pub fn into_expression(self) -> Expression {
        self.tail
    }

    pub fn eval(&self) -> Result<Vec<Value>> {
        self.tail.evaluate()
    }

    /// Engine calls run before this returns; a trailing iteration stage
    /// yields lazily.
    pub fn iter(&self) -> Result<ValueIter<'_>> {
        self.tail.iterate()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tail)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("tail", &self.tail).finish()
    }
}
