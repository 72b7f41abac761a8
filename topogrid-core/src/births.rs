//! Degree-weighted expected-births baseline.
//!
//! Under neutral colonisation every node spreads into each of its neighbours
//! (and, with self-replacement, into itself) with equal probability. A
//! node's weight is the sum of `1 / degree(u)` over every `u` that can
//! colonise it; proportions normalise weights over the whole graph.

use tracing::{debug, instrument};

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, NodeId},
};

/// Treatment of nodes without neighbours.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum IsolatedNodePolicy {
    /// Fail with [`TopologyError::DivisionByZeroDegree`].
    #[default]
    Reject,
    /// Give isolated nodes zero weight and skip their self term.
    ZeroWeight,
}

/// Parameters of the expected-births computation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BirthModel {
    /// Whether a node may replace itself.
    pub self_replacement: bool,
    /// What to do with degree-zero nodes.
    pub isolated_nodes: IsolatedNodePolicy,
}

impl Default for BirthModel {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BirthModel {
    /// Creates a model that rejects isolated nodes.
    #[must_use]
    pub const fn new(self_replacement: bool) -> Self {
        Self {
            self_replacement,
            isolated_nodes: IsolatedNodePolicy::Reject,
        }
    }

    /// Sets the isolated-node policy.
    #[must_use]
    pub const fn with_isolated_nodes(mut self, policy: IsolatedNodePolicy) -> Self {
        self.isolated_nodes = policy;
        self
    }

    /// Computes the expected-births table of `graph`.
    ///
    /// Directed graphs are analysed through their undirected view. An empty
    /// graph yields an empty table.
    ///
    /// # Errors
    /// Returns [`TopologyError::DivisionByZeroDegree`] for the first isolated
    /// node under [`IsolatedNodePolicy::Reject`], and
    /// [`TopologyError::ZeroTotalWeight`] when every weight is zero.
    #[instrument(name = "births.compute", skip(graph), fields(nodes = graph.node_count()))]
    pub fn compute(&self, graph: &Graph) -> Result<ExpectedBirthsTable> {
        let view = graph.to_undirected();
        let adjacency = view.adjacency();
        let inverse_degree = |node: NodeId| {
            adjacency
                .get(&node)
                .map_or(0.0, |neighbours| recip(neighbours.len()))
        };

        let mut weights: Vec<(NodeId, f64)> = Vec::with_capacity(adjacency.len());
        for (&node, neighbours) in &adjacency {
            if neighbours.is_empty() {
                match self.isolated_nodes {
                    IsolatedNodePolicy::Reject => {
                        return Err(TopologyError::DivisionByZeroDegree { node });
                    }
                    IsolatedNodePolicy::ZeroWeight => {
                        weights.push((node, 0.0));
                        continue;
                    }
                }
            }
            let mut weight: f64 = neighbours.iter().map(|&u| inverse_degree(u)).sum();
            if self.self_replacement {
                weight += recip(neighbours.len());
            }
            weights.push((node, weight));
        }

        if weights.is_empty() {
            return Ok(ExpectedBirthsTable::default());
        }
        let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return Err(TopologyError::ZeroTotalWeight);
        }
        let rows = weights
            .into_iter()
            .map(|(node, weight)| ExpectedBirths {
                node,
                weight,
                proportion: weight / total,
            })
            .collect();
        debug!(total, "computed expected births");
        Ok(ExpectedBirthsTable { rows, total })
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "degrees stay far below 2^52 for any graph that fits in memory"
)]
fn recip(degree: usize) -> f64 {
    1.0 / degree as f64
}

/// Expected births of a single node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpectedBirths {
    /// Node the row describes.
    pub node: NodeId,
    /// Raw degree-weighted colonisation weight.
    pub weight: f64,
    /// Weight divided by the total over all nodes.
    pub proportion: f64,
}

/// Expected births for every node, in ascending node order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpectedBirthsTable {
    rows: Vec<ExpectedBirths>,
    total: f64,
}

impl ExpectedBirthsTable {
    /// Returns the rows in ascending node order.
    #[must_use]
    pub fn rows(&self) -> &[ExpectedBirths] {
        &self.rows
    }

    /// Returns the row for `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ExpectedBirths> {
        self.rows
            .binary_search_by_key(&node, |row| row.node)
            .ok()
            .and_then(|index| self.rows.get(index))
    }

    /// Returns the sum of all raw weights.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table as `node,expected_births,prop_births` CSV.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from("node,expected_births,prop_births\n");
        for row in &self.rows {
            out.push_str(&format!("{},{},{}\n", row.node, row.weight, row.proportion));
        }
        out
    }
}

/// Computes expected births with the default isolated-node policy.
///
/// # Errors
/// As for [`BirthModel::compute`].
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, expected_births};
///
/// let mut star = Graph::new();
/// star.add_edge(0, 1);
/// star.add_edge(0, 2);
/// let table = expected_births(&star, false)?;
/// // The hub collects a full share from each leaf.
/// assert_eq!(table.get(0).map(|row| row.weight), Some(2.0));
/// assert_eq!(table.get(1).map(|row| row.weight), Some(0.5));
/// # Ok::<(), topogrid_core::TopologyError>(())
/// ```
pub fn expected_births(graph: &Graph, self_replacement: bool) -> Result<ExpectedBirthsTable> {
    BirthModel::new(self_replacement).compute(graph)
}
