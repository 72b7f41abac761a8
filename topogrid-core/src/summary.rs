//! Descriptive statistics of a topology.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::graph::{Graph, NodeId};

/// Structural summary of one graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of undirected edges.
    pub edges: usize,
    /// Edges over the number of possible pairs; zero below two nodes.
    pub density: f64,
    /// Mean degree.
    pub degree_mean: f64,
    /// Median degree.
    pub degree_median: f64,
    /// Sample variance of the degrees; zero below two nodes.
    pub degree_variance: f64,
    /// Nodes with degree zero.
    pub isolated_nodes: usize,
    /// Number of connected components.
    pub components: usize,
    /// Longest shortest path, for connected non-empty graphs only.
    pub diameter: Option<usize>,
}

impl GraphSummary {
    /// Renders the summary as `metric,value` CSV rows.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let diameter = self
            .diameter
            .map_or_else(|| "NONE".to_owned(), |value| value.to_string());
        format!(
            "metric,value\nnodes,{}\nedges,{}\ndensity,{}\ndegree_mean,{}\ndegree_median,{}\n\
             degree_variance,{}\nisolated_nodes,{}\ncomponents,{}\ndiameter,{}\n",
            self.nodes,
            self.edges,
            self.density,
            self.degree_mean,
            self.degree_median,
            self.degree_variance,
            self.isolated_nodes,
            self.components,
            diameter,
        )
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "counts stay far below 2^52 for any graph that fits in memory"
)]
fn as_f64(value: usize) -> f64 {
    value as f64
}

/// Summarises `graph`, treating directed graphs through their undirected view.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, summarize};
///
/// let mut chain = Graph::new();
/// chain.add_edge(0, 1);
/// chain.add_edge(1, 2);
/// let summary = summarize(&chain);
/// assert_eq!(summary.components, 1);
/// assert_eq!(summary.diameter, Some(2));
/// ```
#[must_use]
pub fn summarize(graph: &Graph) -> GraphSummary {
    let view = graph.to_undirected();
    let adjacency = view.adjacency();
    let nodes = view.node_count();
    let edges = view.edge_count();
    let mut degrees: Vec<usize> = adjacency.values().map(BTreeSet::len).collect();
    degrees.sort_unstable();

    let pairs = as_f64(nodes) * (as_f64(nodes) - 1.0) / 2.0;
    let density = if nodes < 2 { 0.0 } else { as_f64(edges) / pairs };
    let degree_mean = if nodes == 0 {
        0.0
    } else {
        degrees.iter().map(|&d| as_f64(d)).sum::<f64>() / as_f64(nodes)
    };
    let degree_variance = if nodes < 2 {
        0.0
    } else {
        degrees
            .iter()
            .map(|&d| (as_f64(d) - degree_mean).powi(2))
            .sum::<f64>()
            / (as_f64(nodes) - 1.0)
    };

    let components = components(&adjacency);
    let diameter = (components.len() == 1).then(|| {
        adjacency
            .keys()
            .map(|&source| eccentricity(&adjacency, source))
            .max()
            .unwrap_or(0)
    });

    GraphSummary {
        nodes,
        edges,
        density,
        degree_mean,
        degree_median: median(&degrees),
        degree_variance,
        isolated_nodes: degrees.iter().filter(|&&d| d == 0).count(),
        components: components.len(),
        diameter,
    }
}

fn median(sorted: &[usize]) -> f64 {
    let mid = sorted.len() / 2;
    match (sorted.len() % 2, sorted.get(mid)) {
        (_, None) => 0.0,
        (1, Some(&value)) => as_f64(value),
        (_, Some(&upper)) => {
            let lower = mid.checked_sub(1).and_then(|i| sorted.get(i)).copied();
            (as_f64(lower.unwrap_or(upper)) + as_f64(upper)) / 2.0
        }
    }
}

fn bfs_distances(
    adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    source: NodeId,
) -> BTreeMap<NodeId, usize> {
    let mut distances = BTreeMap::from([(source, 0)]);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next = distances.get(&node).map_or(0, |d| d + 1);
        for &neighbour in adjacency.get(&node).into_iter().flatten() {
            if !distances.contains_key(&neighbour) {
                distances.insert(neighbour, next);
                queue.push_back(neighbour);
            }
        }
    }
    distances
}

fn eccentricity(adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>, source: NodeId) -> usize {
    bfs_distances(adjacency, source)
        .into_values()
        .max()
        .unwrap_or(0)
}

fn components(adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>) -> Vec<BTreeSet<NodeId>> {
    let mut seen: BTreeSet<NodeId> = BTreeSet::new();
    let mut found = Vec::new();
    for &node in adjacency.keys() {
        if seen.contains(&node) {
            continue;
        }
        let members: BTreeSet<NodeId> = bfs_distances(adjacency, node).into_keys().collect();
        seen.extend(members.iter().copied());
        found.push(members);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn disconnected_graph_has_no_diameter() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        graph.add_edge(2, 3);
        graph.add_node(4);
        let summary = summarize(&graph);
        assert_eq!(summary.components, 3);
        assert_eq!(summary.isolated_nodes, 1);
        assert_eq!(summary.diameter, None);
        assert!(summary.to_csv().ends_with("diameter,NONE\n"));
    }

    #[rstest]
    fn star_statistics() {
        let mut graph = Graph::new();
        for leaf in 1..5 {
            graph.add_edge(0, leaf);
        }
        let summary = summarize(&graph);
        assert_eq!(summary.edges, 4);
        assert!((summary.density - 0.4).abs() < 1e-12);
        assert!((summary.degree_mean - 1.6).abs() < 1e-12);
        assert!((summary.degree_median - 1.0).abs() < 1e-12);
        // Degrees 1,1,1,1,4: squared deviations 4 * 0.36 + 5.76 = 7.2 over 4.
        assert!((summary.degree_variance - 1.8).abs() < 1e-12);
        assert_eq!(summary.diameter, Some(2));
    }

    #[rstest]
    #[case(&[], 0.0)]
    #[case(&[3], 3.0)]
    #[case(&[1, 2, 4, 9], 3.0)]
    fn median_of_sorted_degrees(#[case] sorted: &[usize], #[case] expected: f64) {
        assert!((median(sorted) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn empty_graph_summary_is_zeroed() {
        let summary = summarize(&Graph::new());
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.components, 0);
        assert_eq!(summary.diameter, None);
    }
}
