//! Families whose structure is fully determined by their parameters.

use crate::graph::{Graph, NodeId};

use super::params::{CavemanConfig, NodeCountConfig, ToroidalLatticeConfig, WindmillConfig};

/// Connects every pair of `members`.
pub(super) fn add_clique(graph: &mut Graph, members: &[NodeId]) {
    for (index, &a) in members.iter().enumerate() {
        graph.add_node(a);
        for &b in members.iter().skip(index + 1) {
            graph.add_edge(a, b);
        }
    }
}

pub(super) fn complete(nodes: usize) -> Graph {
    let members: Vec<NodeId> = (0..nodes).collect();
    let mut graph = Graph::with_nodes(members.iter().copied());
    add_clique(&mut graph, &members);
    graph
}

const fn wrap_back(index: usize, len: usize) -> usize {
    if index == 0 { len - 1 } else { index - 1 }
}

const fn wrap_forward(index: usize, len: usize) -> usize {
    if index + 1 == len { 0 } else { index + 1 }
}

/// Builds a `graph_width` x `graph_height` lattice with wrap-around.
///
/// Node `row * graph_width + column` links to its four neighbours modulo
/// each dimension. With a dimension of 2 the two wrap-around neighbours
/// coincide, and with a dimension of 1 they are the node itself; the
/// resulting duplicates and self-loops are dropped, so degree falls below 4.
/// The dimensions must already be validated so their product fits.
pub(super) fn toroidal_lattice(config: &ToroidalLatticeConfig) -> Graph {
    let width = config.graph_width;
    let height = config.graph_height;
    let mut graph = Graph::with_nodes(0..width * height);
    for row in 0..height {
        for column in 0..width {
            let id = row * width + column;
            let up = wrap_back(row, height) * width + column;
            let down = wrap_forward(row, height) * width + column;
            let left = row * width + wrap_back(column, width);
            let right = row * width + wrap_forward(column, width);
            for neighbour in [up, down, left, right] {
                graph.add_edge(id, neighbour);
            }
        }
    }
    graph
}

pub(super) fn linear_chain(config: &NodeCountConfig) -> Graph {
    let mut graph = Graph::with_nodes(0..config.nodes);
    for node in 1..config.nodes {
        graph.add_edge(node - 1, node);
    }
    graph
}

pub(super) fn cycle(config: &NodeCountConfig) -> Graph {
    let mut graph = linear_chain(config);
    if config.nodes > 1 {
        graph.add_edge(config.nodes - 1, 0);
    }
    graph
}

/// Hub `0` with `nodes - 1` leaves.
pub(super) fn star(config: &NodeCountConfig) -> Graph {
    let mut graph = Graph::with_nodes(0..config.nodes);
    for leaf in 1..config.nodes {
        graph.add_edge(0, leaf);
    }
    graph
}

/// Star plus a cycle through the rim nodes `1..nodes`.
pub(super) fn wheel(config: &NodeCountConfig) -> Graph {
    let mut graph = star(config);
    for rim in 2..config.nodes {
        graph.add_edge(rim - 1, rim);
    }
    if config.nodes > 2 {
        graph.add_edge(config.nodes - 1, 1);
    }
    graph
}

/// Blades of `clique_size` nodes that all share node `0`.
pub(super) fn windmill(config: &WindmillConfig) -> Graph {
    let blade = config.clique_size - 1;
    let mut graph = Graph::with_nodes([0]);
    for index in 0..config.cliques {
        let first = 1 + index * blade;
        let mut members: Vec<NodeId> = Vec::with_capacity(config.clique_size);
        members.push(0);
        members.extend(first..first + blade);
        add_clique(&mut graph, &members);
    }
    graph
}

pub(super) fn caveman(config: &CavemanConfig) -> Graph {
    let mut graph = Graph::new();
    for cave in 0..config.cliques {
        let first = cave * config.clique_size;
        let members: Vec<NodeId> = (first..first + config.clique_size).collect();
        add_clique(&mut graph, &members);
    }
    graph
}

/// Caveman graph where each cave trades one internal edge for a link to the
/// previous cave, turning the caves into a ring.
pub(super) fn connected_caveman(config: &CavemanConfig) -> Graph {
    let mut graph = caveman(config);
    let total = config.cliques * config.clique_size;
    for start in (0..total).step_by(config.clique_size) {
        graph.remove_edge(start, start + 1);
        graph.add_edge(start, (start + total - 1) % total);
    }
    graph
}
