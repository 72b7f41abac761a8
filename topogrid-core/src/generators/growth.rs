//! Growth operator that enlarges an existing graph with pendant nodes.

use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, NodeId},
    seeds::TopologyRng,
};

/// Attaches new pendant nodes until `graph` holds `target_size` nodes.
///
/// Each step picks a uniformly random node already in the graph (including
/// nodes added earlier in the same call) and links it to a fresh node whose
/// id is one past the current maximum, so ids never collide. Returns the
/// number of nodes added; a graph already at or above `target_size` is left
/// untouched.
///
/// # Errors
/// Returns [`TopologyError::InvalidConfig`] when `graph` is empty and
/// `target_size` is positive, since there is no node to attach to.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, add_random_nodes, rng_from_seed};
///
/// let mut graph = Graph::new();
/// graph.add_edge(0, 1);
/// let added = add_random_nodes(&mut graph, 5, &mut rng_from_seed(7))?;
/// assert_eq!(added, 3);
/// assert_eq!(graph.node_count(), 5);
/// # Ok::<(), topogrid_core::TopologyError>(())
/// ```
#[instrument(name = "generator.grow", skip(graph, rng), fields(start = graph.node_count()))]
pub fn add_random_nodes(
    graph: &mut Graph,
    target_size: usize,
    rng: &mut TopologyRng,
) -> Result<usize> {
    let start = graph.node_count();
    if start >= target_size {
        return Ok(0);
    }
    let mut pool: Vec<NodeId> = graph.nodes().collect();
    let mut next_id = graph.next_free_id();
    while graph.node_count() < target_size {
        let Some(&anchor) = pool.choose(rng) else {
            return Err(TopologyError::invalid_config(
                "add-random-nodes",
                "graph",
                "cannot grow a graph without nodes",
            ));
        };
        graph.add_edge(anchor, next_id);
        pool.push(next_id);
        next_id += 1;
    }
    let added = graph.node_count() - start;
    debug!(added, "grew graph");
    Ok(added)
}
