//! `from,to` edge-list CSV.
//!
//! Undirected edges are written once in each direction so readers may load
//! the file either way. Nodes without edges appear as `node,NONE` rows.

use std::collections::BTreeSet;

use crate::{
    error::{FormatError, Result, TopologyError},
    graph::{Graph, NodeId, Orientation},
};

const SENTINEL: &str = "NONE";

/// Renders `graph` as an edge list with a `from,to` header.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, write_edges};
///
/// let mut graph = Graph::new();
/// graph.add_edge(0, 1);
/// graph.add_node(2);
/// assert_eq!(write_edges(&graph), "from,to\n0,1\n1,0\n2,NONE\n");
/// ```
#[must_use]
pub fn write_edges(graph: &Graph) -> String {
    let mut out = String::from("from,to\n");
    let mut represented: BTreeSet<NodeId> = BTreeSet::new();
    for (a, b) in graph.edges() {
        out.push_str(&format!("{a},{b}\n"));
        if !graph.is_directed() {
            out.push_str(&format!("{b},{a}\n"));
        }
        represented.insert(a);
        represented.insert(b);
    }
    for node in graph.nodes().filter(|node| !represented.contains(node)) {
        out.push_str(&format!("{node},{SENTINEL}\n"));
    }
    out
}

/// Parses an edge list, treating rows as arcs when `orientation` is directed.
///
/// The header must name `from` and `to` columns in any order; other columns
/// are ignored. A `NONE` endpoint (any case) adds the other endpoint as a
/// node without an edge.
///
/// # Errors
/// Returns [`TopologyError::Format`] wrapping
/// [`FormatError::MalformedEdgeList`] for a missing header column, a short
/// row, or a non-integer node id.
pub fn read_edges(text: &str, orientation: Orientation) -> Result<Graph> {
    parse(text, orientation).map_err(|error| TopologyError::Format {
        format: "edge list",
        error,
    })
}

fn malformed(line: usize, reason: impl Into<String>) -> FormatError {
    FormatError::MalformedEdgeList {
        line,
        reason: reason.into(),
    }
}

fn clean(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

fn parse(text: &str, orientation: Orientation) -> core::result::Result<Graph, FormatError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((header_line, header)) = lines.next() else {
        return Err(malformed(1, "missing `from,to` header"));
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|field| clean(field).to_ascii_lowercase())
        .collect();
    let locate = |name: &str| {
        columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| malformed(header_line, format!("header lacks a `{name}` column")))
    };
    let from_column = locate("from")?;
    let to_column = locate("to")?;

    let mut graph = Graph::with_orientation(orientation);
    for (line, row) in lines {
        let fields: Vec<&str> = row.split(',').map(clean).collect();
        let (Some(&from), Some(&to)) = (fields.get(from_column), fields.get(to_column)) else {
            return Err(malformed(line, format!("expected at least {} fields", columns.len())));
        };
        match (endpoint(line, from)?, endpoint(line, to)?) {
            (Some(a), Some(b)) => {
                graph.add_edge(a, b);
            }
            (Some(node), None) | (None, Some(node)) => {
                graph.add_node(node);
            }
            (None, None) => {}
        }
    }
    Ok(graph)
}

fn endpoint(line: usize, raw: &str) -> core::result::Result<Option<NodeId>, FormatError> {
    if raw.eq_ignore_ascii_case(SENTINEL) {
        return Ok(None);
    }
    raw.parse::<NodeId>()
        .map(Some)
        .map_err(|_| malformed(line, format!("`{raw}` is not a node id")))
}
