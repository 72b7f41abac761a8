//! Standard random-graph models driven by a caller-supplied random source.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, distributions::Standard, seq::SliceRandom};

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, NodeId},
    seeds::TopologyRng,
};

use super::{
    deterministic::star,
    params::{
        BarabasiAlbertConfig, ErdosRenyiConfig, GeometricConfig, NodeCountConfig,
        RandomRegularConfig, WaxmanConfig,
    },
};

/// Restarts allowed before the regular-graph pairing gives up.
const REGULAR_MAX_ATTEMPTS: usize = 1_000;

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn uniform_points(nodes: usize, dimension: usize, rng: &mut TopologyRng) -> Vec<Vec<f64>> {
    (0..nodes)
        .map(|_| (0..dimension).map(|_| rng.sample(Standard)).collect())
        .collect()
}

pub(super) fn erdos_renyi(config: &ErdosRenyiConfig, rng: &mut TopologyRng) -> Graph {
    let mut graph = Graph::with_nodes(0..config.nodes);
    for u in 0..config.nodes {
        for v in u + 1..config.nodes {
            if rng.gen_bool(config.edge_prob) {
                graph.add_edge(u, v);
            }
        }
    }
    graph
}

/// Preferential attachment seeded with a star on `edges + 1` nodes.
///
/// Every new node picks `edges` distinct targets from a list in which each
/// node appears once per incident edge, so selection is degree-weighted.
pub(super) fn barabasi_albert(config: &BarabasiAlbertConfig, rng: &mut TopologyRng) -> Graph {
    let m = config.edges;
    let mut graph = star(&NodeCountConfig { nodes: m + 1 });
    let mut repeated: Vec<NodeId> = graph
        .degrees()
        .into_iter()
        .flat_map(|(node, degree)| std::iter::repeat_n(node, degree))
        .collect();
    for source in m + 1..config.nodes {
        let mut targets: BTreeSet<NodeId> = BTreeSet::new();
        while targets.len() < m {
            if let Some(&pick) = repeated.choose(rng) {
                targets.insert(pick);
            }
        }
        for &target in &targets {
            graph.add_edge(source, target);
        }
        repeated.extend(targets);
        repeated.extend(std::iter::repeat_n(source, m));
    }
    graph
}

/// Waxman graph on uniform points of the unit square.
pub(super) fn waxman(config: &WaxmanConfig, rng: &mut TopologyRng) -> Graph {
    let points = uniform_points(config.nodes, 2, rng);
    let mut graph = Graph::with_nodes(0..config.nodes);
    let span = points
        .iter()
        .enumerate()
        .flat_map(|(u, a)| points.iter().skip(u + 1).map(move |b| euclidean(a, b)))
        .fold(0.0_f64, f64::max);
    if span <= 0.0 {
        return graph;
    }
    for (u, a) in points.iter().enumerate() {
        for (v, b) in points.iter().enumerate().skip(u + 1) {
            let threshold = config.beta * (-euclidean(a, b) / (config.alpha * span)).exp();
            let draw: f64 = rng.sample(Standard);
            if draw < threshold {
                graph.add_edge(u, v);
            }
        }
    }
    graph
}

pub(super) fn geometric(config: &GeometricConfig, rng: &mut TopologyRng) -> Graph {
    let points = uniform_points(config.nodes, config.dimension, rng);
    let mut graph = Graph::with_nodes(0..config.nodes);
    for (u, a) in points.iter().enumerate() {
        for (v, b) in points.iter().enumerate().skip(u + 1) {
            if euclidean(a, b) <= config.radius {
                graph.add_edge(u, v);
            }
        }
    }
    graph
}

/// Random `degree`-regular graph via repeated stub pairing.
///
/// Each attempt shuffles the open stubs and pairs them off; pairs that would
/// form a self-loop or a parallel edge go back into the pool. An attempt is
/// abandoned once the leftover stubs cannot form any new edge, and the whole
/// construction fails after [`REGULAR_MAX_ATTEMPTS`] abandoned attempts.
///
/// Above half density the pairing is run for the complementary degree
/// `nodes - 1 - degree` and the result is complemented.
pub(super) fn random_regular(config: &RandomRegularConfig, rng: &mut TopologyRng) -> Result<Graph> {
    let nodes = config.nodes;
    let dense = nodes > 0 && config.degree > nodes / 2;
    let degree = if dense {
        nodes - 1 - config.degree
    } else {
        config.degree
    };
    for _ in 0..REGULAR_MAX_ATTEMPTS {
        if let Some(edges) = try_pairing(nodes, degree, rng) {
            let mut graph = Graph::with_nodes(0..nodes);
            if dense {
                for u in 0..nodes {
                    for v in u + 1..nodes {
                        if !edges.contains(&(u, v)) {
                            graph.add_edge(u, v);
                        }
                    }
                }
            } else {
                for (a, b) in edges {
                    graph.add_edge(a, b);
                }
            }
            return Ok(graph);
        }
    }
    Err(TopologyError::GenerationFailed {
        family: "random-regular",
        attempts: REGULAR_MAX_ATTEMPTS,
    })
}

fn try_pairing(
    nodes: usize,
    degree: usize,
    rng: &mut TopologyRng,
) -> Option<BTreeSet<(NodeId, NodeId)>> {
    let mut edges: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    let mut stubs: Vec<NodeId> = (0..nodes)
        .flat_map(|node| std::iter::repeat_n(node, degree))
        .collect();
    while !stubs.is_empty() {
        let mut leftover: BTreeMap<NodeId, usize> = BTreeMap::new();
        stubs.shuffle(rng);
        for pair in stubs.chunks_exact(2) {
            let (a, b) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            if a != b && edges.insert((a, b)) {
                continue;
            }
            *leftover.entry(a).or_default() += 1;
            *leftover.entry(b).or_default() += 1;
        }
        if !can_progress(&edges, &leftover) {
            return None;
        }
        stubs = leftover
            .into_iter()
            .flat_map(|(node, count)| std::iter::repeat_n(node, count))
            .collect();
    }
    Some(edges)
}

/// Returns whether two distinct leftover nodes are still unconnected.
fn can_progress(edges: &BTreeSet<(NodeId, NodeId)>, leftover: &BTreeMap<NodeId, usize>) -> bool {
    if leftover.is_empty() {
        return true;
    }
    leftover.keys().enumerate().any(|(index, &a)| {
        leftover
            .keys()
            .skip(index + 1)
            .any(|&b| !edges.contains(&(a, b)))
    })
}
