use std::fmt;

/// Error produced by an external primitive. Carried through untouched.
pub type PrimitiveError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug)]
pub enum QueryError {
    /// Extension by a name that was never registered.
    UnknownCombinator(String),
    /// A second combinator tried to register under an existing name.
    DuplicateCombinator(String),
    /// The process-wide registry was already installed.
    RegistryInstalled,
    /// A chained composition was forced between incompatible stages.
    IncompatibleComposition { upstream: String, downstream: String },
    /// The external primitive failed. Displays as the original error.
    Primitive(PrimitiveError),
    /// No `[<digits>]` index in a component identifier.
    IndexParse(String),
    /// A component-kind mask with no marker in the table.
    UnknownComponentKind(i64),
    /// Call-style parameters the combinator does not accept.
    InvalidCall { combinator: String, reason: String },
    Config(serde_json::Error),
}

impl QueryError {
    /// Recovers a `QueryError` raised inside a primitive, otherwise keeps the
    /// primitive's own error as is.
    pub fn from_primitive(err: PrimitiveError) -> Self {
        match err.downcast::<QueryError>() {
            Ok(inner) => *inner,
            Err(other) => QueryError::Primitive(other),
        }
    }

    pub fn invalid_call(combinator: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidCall {
            combinator: combinator.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnknownCombinator(name) => write!(f, "no combinator named {}", name),
            QueryError::DuplicateCombinator(name) => {
                write!(f, "combinator {} is already registered", name)
            }
            QueryError::RegistryInstalled => write!(f, "global registry already installed"),
            QueryError::IncompatibleComposition {
                upstream,
                downstream,
            } => write!(f, "cannot chain {} into {}", upstream, downstream),
            QueryError::Primitive(e) => write!(f, "{}", e),
            QueryError::IndexParse(item) => write!(f, "no component index in {:?}", item),
            QueryError::UnknownComponentKind(mask) => {
                write!(f, "no component marker for selection mask {}", mask)
            }
            QueryError::InvalidCall { combinator, reason } => {
                write!(f, "invalid call to {}: {}", combinator, reason)
            }
            QueryError::Config(e) => write!(f, "config: {}", e),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Primitive(e) => Some(e.as_ref()),
            QueryError::Config(e) => Some(e),
            QueryError::UnknownCombinator(_)
            | QueryError::DuplicateCombinator(_)
            | QueryError::RegistryInstalled
            | QueryError::IncompatibleComposition { .. }
            | QueryError::IndexParse(_)
            | QueryError::UnknownComponentKind(_)
            | QueryError::InvalidCall { .. } => None,
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Config(e)
    }
}
