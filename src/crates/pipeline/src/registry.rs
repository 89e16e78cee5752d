//! Name to combinator-kind registry.
//!
//! A `Registry` is filled once at initialization and only read afterwards.
//! Extension by name is the sole way pipelines grow: look the name up,
//! instantiate the kind with its defaults and compose it onto the tail.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use scene_query_primitives::{QueryError, Result};

use crate::builder::Pipeline;
use crate::combinator::Combinator;
use crate::expr::Expression;
use crate::node::ExpressionNode;

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

#[derive(Default)]
pub struct Registry {
    kinds: HashMap<String, Arc<dyn Combinator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind under its own name. Duplicate names are rejected.
    pub fn register(&mut self, kind: impl Combinator) -> Result<()> {
        self.register_arc(Arc::new(kind))
    }

    pub fn register_arc(&mut self, kind: Arc<dyn Combinator>) -> Result<()> {
        let name = kind.name().to_owned();
        if self.kinds.contains_key(&name) {
            return Err(QueryError::DuplicateCombinator(name));
        }
        log::debug!("registered combinator {}", name);
        self.kinds.insert(name, kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Combinator>> {
        self.kinds.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<dyn Combinator>> {
        self.get(name)
            .ok_or_else(|| QueryError::UnknownCombinator(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// A fresh node of the named kind carrying its defaults.
    pub fn instantiate(&self, name: &str) -> Result<ExpressionNode> {
        Ok(ExpressionNode::instantiate(self.lookup(name)?))
    }

    /// Composes the named kind onto `tail`.
    pub fn extend(&self, tail: Expression, name: &str) -> Result<Expression> {
        Ok(tail.compose(self.instantiate(name)?))
    }

    /// Starts a pipeline rooted at the named kind.
    pub fn start(self: &Arc<Self>, name: &str) -> Result<Pipeline> {
        Pipeline::start(self, name)
    }

    /// Publishes this registry process-wide. Only the first install succeeds.
    pub fn install_global(self) -> Result<Arc<Registry>> {
        let registry = Arc::new(self);
        GLOBAL
            .set(Arc::clone(&registry))
            .map_err(|_| QueryError::RegistryInstalled)?;
        Ok(registry)
    }
}

/// The process-wide registry, if one was installed.
pub fn global() -> Option<Arc<Registry>> {
    GLOBAL.get().cloned()
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("combinators", &self.names())
            .finish()
    }
}
