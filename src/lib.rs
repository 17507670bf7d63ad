//! Constraint-based causal structure discovery and validation.
//!
//! Two entry points share the same core machinery:
//! - [`StructureLearner`] discovers a plausible causal graph from data via
//!   the IC* algorithm (edge pruning through conditioning-set search,
//!   collider detection, orientation propagation);
//! - [`ImplicationValidator`] takes a user-supplied [`CausalDag`] and checks
//!   its conditional-independence implications against data, bucketing
//!   agreements and contradictions.
//!
//! The statistical independence test is pluggable through the
//! [`IndependenceTest`] contract; both algorithms assume small-to-moderate
//! variable counts, since conditioning-set search is exponential by nature.

pub mod discovery;
pub mod graph;
pub mod independence;
pub mod sets;
pub mod validation;

pub use discovery::{DiscoveredStructure, DiscoveryError, StructureLearner};
pub use graph::{CausalDag, EdgeKey, Graph, GraphError, Path, PathNode};
pub use independence::{
    DSeparationOracle, IndependenceError, IndependenceTest, Table, TableError,
};
pub use validation::{Implication, ImplicationValidator, ValidationError, ValidationReport};
