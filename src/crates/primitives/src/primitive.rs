//! External query primitives.
//!
//! A primitive is a callable owned by the scene engine. The pipeline never
//! looks inside one; it only invokes it and compares primitives by identity.

use std::fmt;
use std::sync::Arc;

use crate::error::PrimitiveError;
use crate::value::{OptionSet, Value};

/// Outcome of a single primitive invocation. `None` is the absent result.
pub type PrimitiveOutput = Result<Option<Vec<Value>>, PrimitiveError>;

/// An external query callable.
///
/// Implementations should be safe to re-invoke: nothing in the pipeline caches
/// results, so every evaluation calls the primitive again.
pub trait Primitive: Send + Sync + 'static {
    /// Name used when rendering expressions and in logs.
    fn name(&self) -> &str;

    /// Invokes the primitive with positional arguments and named options.
    fn invoke(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput;
}

/// Shared handle to a primitive.
///
/// Two handles are equal only if they point at the same primitive instance.
/// Structural equality is never considered.
#[derive(Clone)]
pub struct PrimitiveRef(Arc<dyn Primitive>);

impl PrimitiveRef {
    pub fn new(primitive: impl Primitive) -> Self {
        Self(Arc::new(primitive))
    }

    pub fn from_arc(primitive: Arc<dyn Primitive>) -> Self {
        Self(primitive)
    }

    /// Wraps a closure as a named primitive.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value], &OptionSet) -> PrimitiveOutput + Send + Sync + 'static,
    {
        Self::new(FnPrimitive::new(name, f))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn invoke(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        log::trace!(
            "invoking {} with {} args, options {}",
            self.0.name(),
            args.len(),
            options
        );
        self.0.invoke(args, options)
    }

    pub fn ptr_eq(&self, other: &PrimitiveRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for PrimitiveRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for PrimitiveRef {}

impl fmt::Debug for PrimitiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrimitiveRef").field(&self.0.name()).finish()
    }
}

/// A primitive backed by a closure.
pub struct FnPrimitive<F> {
    name: String,
    f: F,
}

impl<F> FnPrimitive<F>
where
    F: Fn(&[Value], &OptionSet) -> PrimitiveOutput + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Primitive for FnPrimitive<F>
where
    F: Fn(&[Value], &OptionSet) -> PrimitiveOutput + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        (self.f)(args, options)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn echo() -> PrimitiveRef {
        PrimitiveRef::from_fn("echo", |args, _| Ok(Some(args.to_vec())))
    }

    #[test]
    fn identity_not_structure() {
        let a = echo();
        let b = echo();
        assert_eq!(a, a.clone());
        assert_ne!(a, b, "same name and body but distinct instances");
    }

    #[test]
    fn invoke_passes_through() {
        let p = echo();
        let out = p.invoke(&[json!("a"), json!(1)], &OptionSet::new()).unwrap();
        assert_eq!(out, Some(vec![json!("a"), json!(1)]));
        assert_eq!(format!("{:?}", p), r#"PrimitiveRef("echo")"#);
    }
}
