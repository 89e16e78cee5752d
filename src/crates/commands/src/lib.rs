pub mod components;
pub mod library;
pub mod scene;

/// An in-memory scene for exercising the standard library.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use components::{ComponentMarkers, ExpandPrimitive, componentize, mask};
pub use library::{standard_combinators, standard_registry};
pub use scene::SceneCommands;
