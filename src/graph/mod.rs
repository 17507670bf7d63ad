//! Defines the core data structures for causal graphs.
pub mod core;
pub mod dag;
pub mod error;
pub mod path;

// Re-export key types for convenient access
pub use self::core::{EdgeKey, Graph};
pub use dag::CausalDag;
pub use error::GraphError;
pub use path::{Path, PathNode};
