//! Constraint-based causal structure discovery (the IC* / PC family).
pub mod learner;

pub use learner::{DiscoveredStructure, DiscoveryError, StructureLearner};
