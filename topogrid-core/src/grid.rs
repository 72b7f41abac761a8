//! Assignment of graph nodes to simulation grid cells.
//!
//! Grid positions are enumerated x-major: index `i` is the cell
//! `(i / world_y, i % world_y)`. Nodes are sorted ascending and assigned to
//! that order one-to-one.

use std::{collections::BTreeMap, fmt};

use tracing::{instrument, warn};

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, NodeId},
};

/// Dimensions of the simulation grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GridSize {
    world_x: usize,
    world_y: usize,
}

impl GridSize {
    /// Creates a grid of `world_x` by `world_y` cells.
    ///
    /// # Errors
    /// Returns [`TopologyError::InvalidGrid`] when either dimension is zero
    /// or the cell count overflows.
    pub fn new(world_x: usize, world_y: usize) -> Result<Self> {
        if world_x == 0 || world_y == 0 || world_x.checked_mul(world_y).is_none() {
            return Err(TopologyError::InvalidGrid { world_x, world_y });
        }
        Ok(Self { world_x, world_y })
    }

    /// Returns the extent along x.
    #[must_use]
    pub const fn world_x(self) -> usize {
        self.world_x
    }

    /// Returns the extent along y.
    #[must_use]
    pub const fn world_y(self) -> usize {
        self.world_y
    }

    /// Returns the number of cells.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.world_x * self.world_y
    }

    /// Returns the cell at canonical `index`, if it lies inside the grid.
    #[must_use]
    pub const fn position(self, index: usize) -> Option<GridPosition> {
        if index >= self.capacity() {
            return None;
        }
        Some(GridPosition {
            x: index / self.world_y,
            y: index % self.world_y,
        })
    }

    /// Iterates over every cell in canonical order.
    pub fn positions(self) -> impl Iterator<Item = GridPosition> {
        (0..self.world_x).flat_map(move |x| (0..self.world_y).map(move |y| GridPosition { x, y }))
    }
}

/// A cell of the simulation grid.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridPosition {
    /// Column index, `0 <= x < world_x`.
    pub x: usize,
    /// Row index, `0 <= y < world_y`.
    pub y: usize,
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Injective assignment of graph nodes to grid cells.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeToGridMapping {
    grid: GridSize,
    forward: BTreeMap<NodeId, GridPosition>,
    reverse: BTreeMap<GridPosition, NodeId>,
}

impl NodeToGridMapping {
    /// Returns the grid this mapping targets.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Returns the cell assigned to `node`.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<GridPosition> {
        self.forward.get(&node).copied()
    }

    /// Returns the node placed at `position`.
    #[must_use]
    pub fn node_at(&self, position: GridPosition) -> Option<NodeId> {
        self.reverse.get(&position).copied()
    }

    /// Returns the number of mapped nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns whether no node is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates over `(node, position)` pairs in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, GridPosition)> + '_ {
        self.forward.iter().map(|(&node, &position)| (node, position))
    }

    /// Iterates over the cells that received no node.
    pub fn unmapped_positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.grid
            .positions()
            .filter(|position| !self.reverse.contains_key(position))
    }

    /// Renders the mapping as a `node,x,y` CSV table.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from("node,x,y\n");
        for (node, position) in self.iter() {
            out.push_str(&format!("{node},{},{}\n", position.x, position.y));
        }
        out
    }
}

/// Places the nodes of `graph` on `grid`.
///
/// A grid with more cells than the graph has nodes is accepted with a
/// warning; the trailing cells stay unmapped.
///
/// # Errors
/// Returns [`TopologyError::GraphTooLarge`] when the graph has more nodes
/// than the grid has cells.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, GridPosition, GridSize, map_to_grid};
///
/// let graph = Graph::with_nodes([10, 20, 30]);
/// let mapping = map_to_grid(&graph, GridSize::new(2, 2)?)?;
/// assert_eq!(mapping.position(30), Some(GridPosition { x: 1, y: 0 }));
/// assert_eq!(mapping.unmapped_positions().count(), 1);
/// # Ok::<(), topogrid_core::TopologyError>(())
/// ```
#[instrument(
    name = "grid.map",
    skip(graph),
    fields(nodes = graph.node_count(), capacity = grid.capacity())
)]
pub fn map_to_grid(graph: &Graph, grid: GridSize) -> Result<NodeToGridMapping> {
    let nodes = graph.node_count();
    let capacity = grid.capacity();
    if nodes > capacity {
        return Err(TopologyError::GraphTooLarge { nodes, capacity });
    }
    if nodes < capacity {
        warn!(
            nodes,
            capacity,
            unused = capacity - nodes,
            "grid is larger than the graph; some locations will not be used"
        );
    }
    let forward: BTreeMap<NodeId, GridPosition> = graph.nodes().zip(grid.positions()).collect();
    let reverse = forward
        .iter()
        .map(|(&node, &position)| (position, node))
        .collect();
    Ok(NodeToGridMapping {
        grid,
        forward,
        reverse,
    })
}
