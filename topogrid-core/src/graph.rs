//! Simple graph model shared by every topology operation.
//!
//! Nodes and edges live in ordered sets so iteration, persistence, and grid
//! assignment are reproducible without extra sorting at the call sites.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
};

/// Identifier of a graph node.
pub type NodeId = usize;

/// Whether edges are stored as unordered pairs or as arcs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Orientation {
    /// Each edge is an unordered pair stored once as `(low, high)`.
    #[default]
    Undirected,
    /// Each edge is an ordered `(from, to)` arc.
    Directed,
}

/// A simple graph without self-loops or parallel edges.
///
/// Adding an edge inserts any missing endpoint, so every stored edge always
/// references nodes present in the node set.
///
/// # Examples
/// ```
/// use topogrid_core::Graph;
///
/// let mut graph = Graph::new();
/// assert!(graph.add_edge(0, 1));
/// assert!(!graph.add_edge(1, 0), "reverse duplicates are ignored");
/// assert!(!graph.add_edge(2, 2), "self-loops are ignored");
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Graph {
    orientation: Orientation,
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<(NodeId, NodeId)>,
}

impl Graph {
    /// Creates an empty undirected graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given orientation.
    #[must_use]
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    /// Creates an undirected graph holding `nodes` and no edges.
    #[must_use]
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns how edges are interpreted.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns whether edges are stored as arcs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.orientation == Orientation::Directed
    }

    /// Inserts `node`, returning `true` when it was not already present.
    pub fn add_node(&mut self, node: NodeId) -> bool {
        self.nodes.insert(node)
    }

    /// Inserts an edge between `a` and `b`, adding missing endpoints.
    ///
    /// Returns `true` when a new edge was stored. Self-loops are never
    /// stored, and duplicates (in either direction for undirected graphs)
    /// leave the graph unchanged.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        self.nodes.insert(a);
        self.nodes.insert(b);
        if a == b {
            return false;
        }
        self.edges.insert(self.key(a, b))
    }

    /// Removes the edge between `a` and `b`, returning whether it existed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let key = self.key(a, b);
        self.edges.remove(&key)
    }

    /// Returns whether `node` is part of the graph.
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns whether the edge `a`–`b` (or arc `a`→`b`) is stored.
    #[must_use]
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains(&self.key(a, b))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of stored edges (arcs for directed graphs).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Iterates over stored edges in ascending order.
    ///
    /// Undirected edges are yielded once as `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    /// Returns the smallest id strictly greater than every existing id.
    #[must_use]
    pub fn next_free_id(&self) -> NodeId {
        self.nodes.last().map_or(0, |max| max + 1)
    }

    /// Builds the symmetric neighbour sets of every node.
    ///
    /// Arcs contribute to both endpoints, so directed graphs yield their
    /// undirected neighbourhoods.
    #[must_use]
    pub fn adjacency(&self) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
            self.nodes.iter().map(|&node| (node, BTreeSet::new())).collect();
        for &(a, b) in &self.edges {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        adjacency
    }

    /// Returns the neighbours of `node` in ascending order.
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut found: BTreeSet<NodeId> = BTreeSet::new();
        for &(a, b) in &self.edges {
            if a == node {
                found.insert(b);
            } else if b == node {
                found.insert(a);
            }
        }
        found.into_iter().collect()
    }

    /// Returns the number of distinct neighbours of `node`.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Returns the degree of every node, keyed by id.
    #[must_use]
    pub fn degrees(&self) -> BTreeMap<NodeId, usize> {
        self.adjacency()
            .into_iter()
            .map(|(node, neighbours)| (node, neighbours.len()))
            .collect()
    }

    /// Copies every node and edge of `other` into `self`, shifting ids by `offset`.
    pub fn absorb(&mut self, other: &Self, offset: NodeId) {
        for node in other.nodes() {
            self.add_node(node + offset);
        }
        for (a, b) in other.edges() {
            self.add_edge(a + offset, b + offset);
        }
    }

    /// Returns the undirected view of this graph, borrowing when already undirected.
    #[must_use]
    pub fn to_undirected(&self) -> Cow<'_, Self> {
        match self.orientation {
            Orientation::Undirected => Cow::Borrowed(self),
            Orientation::Directed => {
                let mut view = Self::with_nodes(self.nodes());
                for (a, b) in self.edges() {
                    view.add_edge(a, b);
                }
                Cow::Owned(view)
            }
        }
    }

    fn key(&self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        match self.orientation {
            Orientation::Undirected => (a.min(b), a.max(b)),
            Orientation::Directed => (a, b),
        }
    }
}
