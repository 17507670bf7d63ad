//! Validation of a causal DAG's testable implications against data.
pub mod error;
pub mod validator;

pub use error::ValidationError;
pub use validator::{generate_implications, Implication, ImplicationValidator, ValidationReport};
