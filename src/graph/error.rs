//! Defines the error types for the graph module.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no edge between '{a}' and '{b}'")]
    EdgeNotFound { a: String, b: String },
    #[error("self-loop on '{0}' is not allowed")]
    SelfLoop(String),
    /// Raised by the backdoor criterion when no conditioning candidates
    /// exist because every other node descends from the treatment.
    #[error("every node other than '{0}' is a descendant of it")]
    NoBackdoorCandidates(String),
}
