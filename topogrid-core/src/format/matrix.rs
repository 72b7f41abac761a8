//! Dense 0/1 adjacency matrix text.
//!
//! Rows and columns follow ascending node id order. Reading assigns ids
//! `0..n` by row index, so graphs with non-contiguous ids come back
//! relabelled in the same order.

use crate::{
    error::{FormatError, Result, TopologyError},
    graph::{Graph, NodeId, Orientation},
};

/// Renders `graph` as comma-separated rows, one per node, each ending in a newline.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, write_matrix};
///
/// let mut graph = Graph::new();
/// graph.add_edge(0, 1);
/// graph.add_node(2);
/// assert_eq!(write_matrix(&graph), "0,1,0\n1,0,0\n0,0,0\n");
/// ```
#[must_use]
pub fn write_matrix(graph: &Graph) -> String {
    let order: Vec<NodeId> = graph.nodes().collect();
    let mut out = String::with_capacity(order.len() * order.len() * 2);
    for &from in &order {
        for (column, &to) in order.iter().enumerate() {
            if column > 0 {
                out.push(',');
            }
            out.push(if graph.contains_edge(from, to) { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

/// Parses an undirected graph from matrix text.
///
/// Any positive cell is an edge; diagonal cells are ignored. Surrounding
/// blank lines are tolerated.
///
/// # Errors
/// Returns [`TopologyError::Format`] wrapping [`FormatError::EmptyMatrix`],
/// [`FormatError::MalformedMatrix`] for a non-square matrix, or
/// [`FormatError::MalformedEntry`] for a non-integer cell.
pub fn read_matrix(text: &str) -> Result<Graph> {
    read_matrix_as(text, Orientation::Undirected)
}

pub(super) fn read_matrix_as(text: &str, orientation: Orientation) -> Result<Graph> {
    parse(text, orientation).map_err(|error| TopologyError::Format {
        format: "matrix",
        error,
    })
}

fn parse(text: &str, orientation: Orientation) -> core::result::Result<Graph, FormatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FormatError::EmptyMatrix);
    }
    let rows = trimmed
        .lines()
        .enumerate()
        .map(|(row, line)| parse_row(row, line))
        .collect::<core::result::Result<Vec<_>, _>>()?;
    let size = rows.len();
    if let Some((row, cells)) = rows.iter().enumerate().find(|(_, cells)| cells.len() != size) {
        return Err(FormatError::MalformedMatrix {
            row,
            expected: size,
            found: cells.len(),
        });
    }

    let mut graph = Graph::with_orientation(orientation);
    for node in 0..size {
        graph.add_node(node);
    }
    for (from, cells) in rows.iter().enumerate() {
        for (to, &value) in cells.iter().enumerate() {
            if value > 0 {
                graph.add_edge(from, to);
            }
        }
    }
    Ok(graph)
}

fn parse_row(row: usize, line: &str) -> core::result::Result<Vec<i64>, FormatError> {
    line.trim()
        .split(',')
        .enumerate()
        .map(|(column, raw)| {
            let value = raw.trim();
            value
                .parse::<i64>()
                .map_err(|_| FormatError::MalformedEntry {
                    row,
                    column,
                    value: value.to_owned(),
                })
        })
        .collect()
}
