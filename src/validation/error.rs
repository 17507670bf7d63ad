//! Defines the error types for the validation module.
use thiserror::Error;

use crate::independence::IndependenceError;

/// A failure while checking a DAG's implications against data. The check is
/// aborted on the first failed test invocation; there is no partial report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("independence test failed for ({treatment}, {outcome} | {conditioning:?}): {source}")]
    Independence {
        treatment: String,
        outcome: String,
        conditioning: Vec<String>,
        source: IndependenceError,
    },
}
