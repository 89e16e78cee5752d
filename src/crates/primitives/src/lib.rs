//! Data model shared by every query crate: values, option sets, external
//! primitives and the error type.

pub mod error;
pub mod primitive;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{PrimitiveError, QueryError, Result};
pub use primitive::{FnPrimitive, Primitive, PrimitiveOutput, PrimitiveRef};
pub use value::{OptionSet, PositionalArgs, Value, format_args, is_truthy};
