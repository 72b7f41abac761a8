use proptest::prelude::*;
use serde_json::Value;
use topogrid_core::{Graph, GeneratorParams};

/// Converts a `json!` object literal into generator parameters.
pub fn params(value: Value) -> GeneratorParams {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Simple graphs on `1..=max_nodes` contiguous nodes with arbitrary edges.
pub fn graph_strategy(max_nodes: usize) -> impl Strategy<Value = Graph> {
    (1..=max_nodes).prop_flat_map(|nodes| {
        proptest::collection::vec((0..nodes, 0..nodes), 0..nodes * 2).prop_map(move |pairs| {
            let mut graph = Graph::with_nodes(0..nodes);
            for (a, b) in pairs {
                graph.add_edge(a, b);
            }
            graph
        })
    })
}

/// Graphs in which every node has at least one neighbour.
pub fn connected_degree_strategy(max_nodes: usize) -> impl Strategy<Value = Graph> {
    graph_strategy(max_nodes)
        .prop_filter("at least two nodes", |graph| graph.node_count() >= 2)
        .prop_map(|mut graph| {
            // Chain every node to its successor so no degree is zero.
            let nodes: Vec<usize> = graph.nodes().collect();
            for pair in nodes.windows(2) {
                graph.add_edge(pair[0], pair[1]);
            }
            graph
        })
}
