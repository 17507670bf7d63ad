//! core.rs
//! The orientable skeleton graph: an undirected labeled graph where each
//! edge carries a tri-state orientation mark. Wraps `petgraph::UnGraph` the
//! same way the store layer wraps its arena, so callers only ever see labels.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::all_simple_paths;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// Canonical unordered key for an edge: the two endpoint labels in
/// lexicographic order. Using one key per edge (instead of one entry per
/// direction) keeps the orientation state impossible to desynchronize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(String, String);

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

/// Orientation of one edge relative to its canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Orientation {
    Undirected,
    FirstToSecond,
    SecondToFirst,
}

/// An undirected graph over string-labeled nodes whose edges can be oriented
/// one at a time, as the structure learner discovers causal directions.
///
/// Nodes are created implicitly by `add_edge` (or explicitly by `add_node`)
/// and never removed; removing an edge keeps its endpoints, so an isolated
/// node remains part of the variable set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "GraphData", try_from = "GraphData")]
pub struct Graph {
    skeleton: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    orientation: HashMap<EdgeKey, Orientation>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node if it is not already present.
    pub fn add_node(&mut self, label: &str) {
        self.ensure_node(label);
    }

    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(label) {
            return ix;
        }
        let ix = self.skeleton.add_node(label.to_string());
        self.index.insert(label.to_string(), ix);
        ix
    }

    /// Adds an undirected edge between `a` and `b`, creating the endpoints
    /// as needed. Re-adding an existing edge resets it to undirected.
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a.to_string()));
        }
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        self.skeleton.update_edge(ia, ib, ());
        self.orientation.insert(EdgeKey::new(a, b), Orientation::Undirected);
        Ok(())
    }

    /// Removes the edge between `a` and `b` along with its orientation mark.
    pub fn remove_edge(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        let missing = || GraphError::EdgeNotFound { a: a.to_string(), b: b.to_string() };
        let ia = *self.index.get(a).ok_or_else(missing)?;
        let ib = *self.index.get(b).ok_or_else(missing)?;
        let edge = self.skeleton.find_edge(ia, ib).ok_or_else(missing)?;
        self.skeleton.remove_edge(edge);
        self.orientation.remove(&EdgeKey::new(a, b));
        Ok(())
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.orientation.contains_key(&EdgeKey::new(a, b))
    }

    pub fn node_count(&self) -> usize {
        self.skeleton.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.skeleton.edge_count()
    }

    /// Node labels in insertion order.
    pub fn nodes(&self) -> Vec<&str> {
        self.skeleton
            .node_indices()
            .map(|ix| self.skeleton[ix].as_str())
            .collect()
    }

    /// Edges as label pairs, in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.skeleton
            .edge_references()
            .map(|e| {
                (
                    self.skeleton[e.source()].as_str(),
                    self.skeleton[e.target()].as_str(),
                )
            })
            .collect()
    }

    pub fn neighbors<'a>(&'a self, v: &str) -> Vec<&'a str> {
        let Some(&ix) = self.index.get(v) else {
            return Vec::new();
        };
        self.skeleton
            .neighbors(ix)
            .map(|n| self.skeleton[n].as_str())
            .collect()
    }

    /// Returns the endpoint the edge between `from` and `to` points at, or
    /// `None` when the edge is undirected or absent. The answer is the same
    /// whichever way round the endpoints are given: after `orient("a", "b")`,
    /// both `orientation("a", "b")` and `orientation("b", "a")` are
    /// `Some("b")`.
    pub fn orientation<'a>(&'a self, from: &'a str, to: &'a str) -> Option<&'a str> {
        let (min, max) = if from <= to { (from, to) } else { (to, from) };
        match self.orientation.get(&EdgeKey::new(from, to))? {
            Orientation::Undirected => None,
            Orientation::FirstToSecond => Some(max),
            Orientation::SecondToFirst => Some(min),
        }
    }

    /// Directs the edge `from` -> `to`. Overwrites any previous direction.
    pub fn orient(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let key = EdgeKey::new(from, to);
        let mark = if key.first() == from {
            Orientation::FirstToSecond
        } else {
            Orientation::SecondToFirst
        };
        let slot = self
            .orientation
            .get_mut(&key)
            .ok_or_else(|| GraphError::EdgeNotFound { a: from.to_string(), b: to.to_string() })?;
        *slot = mark;
        Ok(())
    }

    /// Resets the edge between `a` and `b` to undirected.
    pub fn unorient(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        let slot = self
            .orientation
            .get_mut(&EdgeKey::new(a, b))
            .ok_or_else(|| GraphError::EdgeNotFound { a: a.to_string(), b: b.to_string() })?;
        *slot = Orientation::Undirected;
        Ok(())
    }

    /// Neighbors the edge points away from `v` toward. Only meaningful once
    /// some edges have been oriented.
    pub fn successors<'a>(&'a self, v: &'a str) -> Vec<&'a str> {
        self.neighbors(v)
            .into_iter()
            .filter(|n| self.orientation(v, n) == Some(*n))
            .collect()
    }

    /// Transitive closure of `successors`, worklist traversal with a visited
    /// set so it terminates even if an orientation bug introduces a cycle.
    pub fn descendants<'a>(&'a self, v: &'a str) -> HashSet<&'a str> {
        let mut found = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![v];

        while let Some(current) = stack.pop() {
            visited.insert(current);
            for successor in self.successors(current) {
                found.insert(successor);
                if !visited.contains(successor) {
                    stack.push(successor);
                }
            }
        }
        found
    }

    /// Every simple path between `a` and `b` over the undirected skeleton,
    /// causal and non-causal alike. Exponential in the worst case; the
    /// target scale is small variable counts.
    pub fn all_simple_paths(&self, a: &str, b: &str) -> Vec<Vec<String>> {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return Vec::new();
        };
        all_simple_paths::<Vec<_>, _>(&self.skeleton, ia, ib, 0, None)
            .map(|path| {
                path.into_iter()
                    .map(|ix| self.skeleton[ix].clone())
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (a, b) in self.edges() {
            match self.orientation(a, b) {
                Some(target) => writeln!(f, "{} to {}, directed at {}", a, b, target)?,
                None => writeln!(f, "{} to {}, undirected", a, b)?,
            }
        }
        Ok(())
    }
}

// --- Serialization mirror ---
// Persist an edge list rather than petgraph internals; the arena and the
// label cache are rebuilt on load.

#[derive(Serialize, Deserialize)]
struct GraphData {
    nodes: Vec<String>,
    edges: Vec<EdgeRecord>,
}

#[derive(Serialize, Deserialize)]
struct EdgeRecord {
    a: String,
    b: String,
    points_to: Option<String>,
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        let nodes = graph.nodes().iter().map(|s| s.to_string()).collect();
        let edges = graph
            .edges()
            .iter()
            .map(|&(a, b)| EdgeRecord {
                a: a.to_string(),
                b: b.to_string(),
                points_to: graph.orientation(a, b).map(String::from),
            })
            .collect();
        GraphData { nodes, edges }
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, GraphError> {
        let mut graph = Graph::new();
        for node in &data.nodes {
            graph.add_node(node);
        }
        for edge in &data.edges {
            graph.add_edge(&edge.a, &edge.b)?;
            if let Some(target) = &edge.points_to {
                let source = if target == &edge.a { &edge.b } else { &edge.a };
                graph.orient(source, target)?;
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        // a -> b -> c
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.add_edge("b", "c").unwrap();
        g.orient("a", "b").unwrap();
        g.orient("b", "c").unwrap();
        g
    }

    #[test]
    fn test_orientation_is_symmetric() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.orient("a", "b").unwrap();
        assert_eq!(g.orientation("a", "b"), Some("b"));
        assert_eq!(g.orientation("b", "a"), Some("b"));
    }

    #[test]
    fn test_readding_edge_resets_orientation() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.orient("a", "b").unwrap();
        g.add_edge("a", "b").unwrap();
        assert_eq!(g.orientation("a", "b"), None);
    }

    #[test]
    fn test_remove_then_add_is_undirected() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.orient("b", "a").unwrap();
        g.remove_edge("a", "b").unwrap();
        g.add_edge("a", "b").unwrap();
        assert_eq!(g.orientation("a", "b"), None);
        assert_eq!(g.orientation("b", "a"), None);
    }

    #[test]
    fn test_remove_missing_edge_fails() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        let err = g.remove_edge("a", "c").unwrap_err();
        assert_eq!(
            err,
            GraphError::EdgeNotFound { a: "a".into(), b: "c".into() }
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut g = Graph::new();
        assert_eq!(g.add_edge("a", "a").unwrap_err(), GraphError::SelfLoop("a".into()));
    }

    #[test]
    fn test_successors_and_descendants() {
        let g = chain();
        assert_eq!(g.successors("b"), vec!["c"]);
        assert!(g.successors("c").is_empty());

        let desc = g.descendants("a");
        assert_eq!(desc.len(), 2);
        assert!(desc.contains("b") && desc.contains("c"));
        assert!(!desc.contains("a"));
    }

    #[test]
    fn test_all_simple_paths_diamond() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.add_edge("a", "c").unwrap();
        g.add_edge("b", "d").unwrap();
        g.add_edge("c", "d").unwrap();

        let mut paths = g.all_simple_paths("a", "d");
        paths.sort();
        assert_eq!(
            paths,
            vec![
                vec!["a".to_string(), "b".into(), "d".into()],
                vec!["a".to_string(), "c".into(), "d".into()],
            ]
        );
    }

    #[test]
    fn test_paths_for_unknown_labels_empty() {
        let g = chain();
        assert!(g.all_simple_paths("a", "zz").is_empty());
    }

    #[test]
    fn test_display_lists_each_edge() {
        let mut g = Graph::new();
        g.add_edge("a", "b").unwrap();
        g.add_edge("b", "c").unwrap();
        g.orient("a", "b").unwrap();
        let rendered = g.to_string();
        assert!(rendered.contains("directed at b"));
        assert!(rendered.contains("undirected"));
    }

    #[test]
    fn test_json_round_trip() {
        let g = chain();
        let json = serde_json::to_string(&g).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.edge_count(), 2);
        assert_eq!(restored.orientation("a", "b"), Some("b"));
        assert_eq!(restored.orientation("b", "c"), Some("c"));
    }
}
