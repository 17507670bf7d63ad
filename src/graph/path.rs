//! A simple path through the skeleton, with collider bookkeeping and the
//! d-separation predicate.

use super::core::Graph;

/// One interior node of a path. Collider status is fixed when the path is
/// built; conditioning status is derived per d-separation query and never
/// stored, so a `Path` can be queried with many different sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub label: String,
    pub is_collider: bool,
}

/// An ordered sequence of at least two distinct node labels, classified
/// against the orientation state of the graph it was built from. Paths are
/// short-lived read views: build one per query batch and discard it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    labels: Vec<String>,
    interior: Vec<PathNode>,
}

impl Path {
    /// Builds a path from a label sequence, classifying every interior node
    /// as a collider when both adjacent path edges point into it.
    pub fn new(labels: Vec<String>, graph: &Graph) -> Self {
        let mut interior = Vec::new();
        for i in 1..labels.len().saturating_sub(1) {
            let node = &labels[i];
            let previous = &labels[i - 1];
            let next = &labels[i + 1];
            let is_collider = graph.orientation(node, previous) == Some(node.as_str())
                && graph.orientation(node, next) == Some(node.as_str());
            interior.push(PathNode { label: node.clone(), is_collider });
        }
        Self { labels, interior }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn interior(&self) -> &[PathNode] {
        &self.interior
    }

    /// Whether conditioning on `z` blocks this path.
    ///
    /// The path is blocked when any non-collider interior node is in `z`,
    /// or when any collider interior node is not in `z`. A direct edge has
    /// no interior nodes and is therefore never d-separated.
    pub fn is_dseparated<S: AsRef<str>>(&self, z: &[S]) -> bool {
        let conditioned = |label: &str| z.iter().any(|s| s.as_ref() == label);

        for node in &self.interior {
            if !node.is_collider && conditioned(&node.label) {
                return true;
            }
        }
        for node in &self.interior {
            if node.is_collider && !conditioned(&node.label) {
                return true;
            }
        }
        false
    }
}
