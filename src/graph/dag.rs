//! dag.rs
//! The directed specialization of `Graph`, plus the backdoor-criterion query.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::core::Graph;
use super::error::GraphError;
use super::path::Path;
use crate::sets;

/// A causal DAG: same storage as `Graph`, except every edge is directed at
/// insertion time. Acyclicity is assumed from the caller, not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CausalDag {
    graph: Graph,
}

impl CausalDag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, label: &str) {
        self.graph.add_node(label);
    }

    /// Adds the directed edge `from` -> `to`.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        self.graph.add_edge(from, to)?;
        self.graph.orient(from, to)
    }

    pub fn remove_edge(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        self.graph.remove_edge(a, b)
    }

    pub fn as_graph(&self) -> &Graph {
        &self.graph
    }

    /// Finds every conditioning set `Z` satisfying the backdoor criterion
    /// between treatment `x` and outcome `y`: `Z` contains no descendant of
    /// `x` and blocks every backdoor path (a path whose first edge points
    /// into `x`).
    ///
    /// Candidates range over every non-empty subset of the non-descendants
    /// of `x`. Fails when no non-descendant exists besides `x` itself;
    /// returns an empty list when there are no backdoor paths at all.
    pub fn backdoor_criterion(&self, x: &str, y: &str) -> Result<Vec<Vec<String>>, GraphError> {
        let descendants = self.graph.descendants(x);
        let nondescendants: Vec<String> = self
            .graph
            .nodes()
            .into_iter()
            .filter(|n| *n != x && !descendants.contains(n))
            .map(String::from)
            .collect();

        if nondescendants.is_empty() {
            return Err(GraphError::NoBackdoorCandidates(x.to_string()));
        }

        let candidate_sets = sets::all_possible_sets(&nondescendants, None, false);

        let mut backdoor_paths = Vec::new();
        for path in self.graph.all_simple_paths(x, y) {
            if self.graph.orientation(x, &path[1]) == Some(x) {
                backdoor_paths.push(Path::new(path, &self.graph));
            }
        }

        if backdoor_paths.is_empty() {
            return Ok(Vec::new());
        }

        Ok(candidate_sets
            .into_iter()
            .filter(|z| backdoor_paths.iter().all(|p| p.is_dseparated(z)))
            .collect())
    }
}

/// Read access to the underlying graph surface (`nodes`, `edges`,
/// `orientation`, path enumeration) without re-wrapping every method.
impl Deref for CausalDag {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}
