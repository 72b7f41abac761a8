//! Clique-based families whose links are placed at random.
//!
//! Every function draws from the caller's [`TopologyRng`], so the same seed
//! always yields the same link endpoints.

use rand::{Rng, distributions::Standard, seq::SliceRandom};

use crate::{
    graph::{Graph, NodeId},
    seeds::TopologyRng,
};

use super::{
    deterministic::{add_clique, caveman, complete},
    params::{
        CavemanConfig, CliqueRingConfig, CometKiteConfig, HierarchicalCliqueRingConfig,
        RelaxedCavemanConfig,
    },
};

/// Joins `from` and `to` directly, or through `between` fresh chain nodes.
///
/// Chain nodes take ids from `next_id`, which is advanced past them.
fn link(graph: &mut Graph, from: NodeId, to: NodeId, between: usize, next_id: &mut NodeId) {
    let mut previous = from;
    for _ in 0..between {
        graph.add_edge(previous, *next_id);
        previous = *next_id;
        *next_id += 1;
    }
    graph.add_edge(previous, to);
}

/// Links each member to the next one (cyclically) through random endpoints.
fn close_ring(
    graph: &mut Graph,
    members: &[Vec<NodeId>],
    between: usize,
    rng: &mut TopologyRng,
) {
    let mut next_id = graph.next_free_id();
    for (index, current) in members.iter().enumerate() {
        let following = &members[(index + 1) % members.len()];
        let from = current.choose(rng).copied();
        let to = following.choose(rng).copied();
        if let (Some(from), Some(to)) = (from, to) {
            link(graph, from, to, between, &mut next_id);
        }
    }
}

/// Complete core with tails hanging off core node `0`, grown at random.
pub(super) fn comet_kite(config: &CometKiteConfig, rng: &mut TopologyRng) -> Graph {
    let mut graph = complete(config.core_size);
    if config.core_size == 0 {
        return graph;
    }
    let first_tail = config.core_size;
    let mut tails: Vec<NodeId> = (first_tail..first_tail + config.num_tails).collect();
    for &tail in &tails {
        graph.add_edge(0, tail);
    }
    if tails.is_empty() {
        return graph;
    }
    let mut next_id = first_tail + config.num_tails;
    for _ in 0..config.additional_tail_nodes {
        if let Some(&attach) = tails.choose(rng) {
            graph.add_edge(attach, next_id);
        }
        tails.push(next_id);
        next_id += 1;
    }
    graph
}

pub(super) fn clique_ring(config: &CliqueRingConfig, rng: &mut TopologyRng) -> Graph {
    let size = config.clique_size;
    let cliques: Vec<Vec<NodeId>> = (0..config.clique_count)
        .map(|index| (index * size..(index + 1) * size).collect())
        .collect();
    let mut graph = Graph::new();
    for members in &cliques {
        add_clique(&mut graph, members);
    }
    close_ring(&mut graph, &cliques, config.nodes_between_cliques, rng);
    graph
}

/// Builds `community_count^layers` base rings and merges them, group by
/// group, until a single ring of rings remains.
pub(super) fn hierarchical_clique_ring(
    config: &HierarchicalCliqueRingConfig,
    base_rings: usize,
    rng: &mut TopologyRng,
) -> Graph {
    let ring = CliqueRingConfig {
        clique_size: config.clique_size,
        clique_count: config.community_count,
        nodes_between_cliques: config.nodes_between_communities,
        seed: None,
    };
    let mut rings: Vec<Graph> = (0..base_rings).map(|_| clique_ring(&ring, rng)).collect();
    while rings.len() > 1 {
        rings = rings
            .chunks(config.community_count)
            .map(|group| merge_into_ring(group, config.nodes_between_communities, rng))
            .collect();
    }
    rings.pop().unwrap_or_default()
}

fn merge_into_ring(group: &[Graph], between: usize, rng: &mut TopologyRng) -> Graph {
    let mut merged = Graph::new();
    let mut members: Vec<Vec<NodeId>> = Vec::with_capacity(group.len());
    for ring in group {
        let offset = merged.next_free_id();
        merged.absorb(ring, offset);
        members.push(ring.nodes().map(|node| node + offset).collect());
    }
    close_ring(&mut merged, &members, between, rng);
    merged
}

/// Caveman graph whose edges are rewired to random nodes with `rewire_prob`.
///
/// A rewiring draw that lands on the edge's own source or on an existing
/// neighbour leaves the edge in place.
pub(super) fn relaxed_caveman(config: &RelaxedCavemanConfig, rng: &mut TopologyRng) -> Graph {
    let mut graph = caveman(&CavemanConfig {
        cliques: config.cliques,
        clique_size: config.clique_size,
    });
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let existing: Vec<(NodeId, NodeId)> = graph.edges().collect();
    for (u, v) in existing {
        let draw: f64 = rng.sample(Standard);
        if draw >= config.rewire_prob {
            continue;
        }
        let Some(&target) = nodes.choose(rng) else {
            continue;
        };
        if target == u || graph.contains_edge(u, target) {
            continue;
        }
        graph.remove_edge(u, v);
        graph.add_edge(u, target);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::seeds::rng_from_seed;

    #[rstest]
    fn comet_kite_counts() {
        let config = CometKiteConfig {
            core_size: 5,
            num_tails: 3,
            additional_tail_nodes: 4,
            seed: None,
        };
        let graph = comet_kite(&config, &mut rng_from_seed(1));
        assert_eq!(graph.node_count(), 12);
        // 10 core edges, 3 tail edges, 4 growth edges.
        assert_eq!(graph.edge_count(), 17);
        assert_eq!(graph.degree(0), 4 + 3);
    }

    #[rstest]
    fn comet_kite_without_tails_skips_growth() {
        let config = CometKiteConfig {
            core_size: 4,
            num_tails: 0,
            additional_tail_nodes: 10,
            seed: None,
        };
        let graph = comet_kite(&config, &mut rng_from_seed(1));
        assert_eq!(graph.node_count(), 4);
    }

    #[rstest]
    #[case(0, 4 * 10 + 4)]
    #[case(2, 4 * 10 + 4 * 3)]
    fn clique_ring_edge_budget(#[case] between: usize, #[case] edges: usize) {
        let config = CliqueRingConfig {
            clique_size: 5,
            clique_count: 4,
            nodes_between_cliques: between,
            seed: None,
        };
        let graph = clique_ring(&config, &mut rng_from_seed(3));
        assert_eq!(graph.node_count(), 20 + 4 * between);
        assert_eq!(graph.edge_count(), edges);
    }

    #[rstest]
    fn link_threads_chain_nodes() {
        let mut graph = Graph::with_nodes([0, 1]);
        let mut next_id = 2;
        link(&mut graph, 0, 1, 3, &mut next_id);
        assert_eq!(next_id, 5);
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(0, 2), (1, 4), (2, 3), (3, 4)]);
    }

    #[rstest]
    fn relaxed_caveman_without_rewiring_is_caveman() {
        let config = RelaxedCavemanConfig {
            cliques: 3,
            clique_size: 4,
            rewire_prob: 0.0,
            seed: None,
        };
        let graph = relaxed_caveman(&config, &mut rng_from_seed(9));
        assert_eq!(graph.edge_count(), 18);
    }
}
