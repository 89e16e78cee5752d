//! Primitives for tests: they record every invocation and answer with canned
//! results.

use std::sync::{Arc, Mutex};

use crate::primitive::{Primitive, PrimitiveOutput, PrimitiveRef};
use crate::value::{OptionSet, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub primitive: String,
    pub args: Vec<Value>,
    pub options: OptionSet,
}

/// Shared log of invocations, cloned into every recording primitive.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Invocation>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, invocation: Invocation) {
        self.0.lock().expect("poisoned lock").push(invocation);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.0.lock().expect("poisoned lock").clone()
    }

    /// Primitive names in invocation order.
    pub fn names(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.primitive).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().expect("poisoned lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().expect("poisoned lock").clear();
    }
}

type Respond = Box<dyn Fn(&[Value], &OptionSet) -> PrimitiveOutput + Send + Sync>;

pub struct RecordingPrimitive {
    name: String,
    log: CallLog,
    respond: Respond,
}

impl RecordingPrimitive {
    pub fn with<F>(name: impl Into<String>, log: &CallLog, respond: F) -> PrimitiveRef
    where
        F: Fn(&[Value], &OptionSet) -> PrimitiveOutput + Send + Sync + 'static,
    {
        PrimitiveRef::new(Self {
            name: name.into(),
            log: log.clone(),
            respond: Box::new(respond),
        })
    }

    /// Answers with its own positional arguments.
    pub fn echo(name: impl Into<String>, log: &CallLog) -> PrimitiveRef {
        Self::with(name, log, |args, _| Ok(Some(args.to_vec())))
    }

    /// Answers with a fixed result, ignoring its input.
    pub fn returning(name: impl Into<String>, log: &CallLog, results: Vec<Value>) -> PrimitiveRef {
        Self::with(name, log, move |_, _| Ok(Some(results.clone())))
    }

    /// Answers with the absent result.
    pub fn absent(name: impl Into<String>, log: &CallLog) -> PrimitiveRef {
        Self::with(name, log, |_, _| Ok(None))
    }

    /// Always fails with an I/O error carrying `message`.
    pub fn failing(name: impl Into<String>, log: &CallLog, message: &'static str) -> PrimitiveRef {
        Self::with(name, log, move |_, _| Err(std::io::Error::other(message).into()))
    }
}

impl Primitive for RecordingPrimitive {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &[Value], options: &OptionSet) -> PrimitiveOutput {
        self.log.push(Invocation {
            primitive: self.name.clone(),
            args: args.to_vec(),
            options: options.clone(),
        });
        (self.respond)(args, options)
    }
}
