//! Grid reconfiguration commands that impose a topology on the simulation.
//!
//! Commands are built as typed values and only turned into text when the
//! sequence is rendered. The rendered form is parsed by simulation tooling,
//! so its token order and spacing are fixed.

use std::{collections::BTreeSet, fmt};

use tracing::{debug, instrument, warn};

use crate::{
    error::{Result, TopologyError},
    graph::{Graph, NodeId},
    grid::{GridPosition, NodeToGridMapping},
};

const DISCONNECT_BANNER: &str = "# -- Disconnect all locations --";
/// Ends with a space.
const RECONNECT_BANNER: &str = "# -- Reconnect locations to impose spatial structure -- ";

/// Scheduling prefix placed before every command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventTrigger(String);

impl EventTrigger {
    /// Wraps a custom trigger such as `u 100`.
    #[must_use]
    pub fn new(trigger: impl Into<String>) -> Self {
        Self(trigger.into())
    }

    /// Returns the trigger text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventTrigger {
    fn default() -> Self {
        Self::new("u begin")
    }
}

/// One grid reconfiguration instruction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Command {
    /// Removes every connection between cells.
    DisconnectAll,
    /// Connects two cells in both directions.
    Connect(GridPosition, GridPosition),
}

impl Command {
    fn render(self, trigger: &EventTrigger, out: &mut String) {
        out.push_str(trigger.as_str());
        match self {
            Self::DisconnectAll => out.push_str(" DisconnectCellsAll"),
            Self::Connect(from, to) => out.push_str(&format!(" ConnectCells {from} {to}")),
        }
    }
}

/// Ordered commands that rebuild grid connectivity from scratch.
///
/// The first command is always [`Command::DisconnectAll`], followed by one
/// [`Command::Connect`] per unordered pair of cells.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSequence {
    trigger: EventTrigger,
    commands: Vec<Command>,
}

impl CommandSequence {
    /// Returns the commands in emission order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the number of connect commands.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Connect(..)))
            .count()
    }

    /// Replaces the trigger used when rendering.
    #[must_use]
    pub fn with_trigger(mut self, trigger: EventTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Renders the sequence with its section banners, one command per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(DISCONNECT_BANNER);
        out.push('\n');
        let mut reconnect_started = false;
        for &command in &self.commands {
            if matches!(command, Command::Connect(..)) && !reconnect_started {
                out.push_str(RECONNECT_BANNER);
                out.push('\n');
                reconnect_started = true;
            }
            command.render(&self.trigger, &mut out);
            out.push('\n');
        }
        if !reconnect_started {
            out.push_str(RECONNECT_BANNER);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds the command sequence that imposes `graph` on the mapped grid.
///
/// Connections are keyed by the unordered pair of cells, so an edge stored
/// in both directions yields a single command. Directed graphs are accepted
/// with a warning because the simulation treats every connection as
/// bidirectional. The default [`EventTrigger`] is used.
///
/// # Errors
/// Returns [`TopologyError::UnmappedNode`] when an edge endpoint has no cell.
///
/// # Examples
/// ```
/// use topogrid_core::{Graph, GridSize, emit_events, map_to_grid};
///
/// let mut graph = Graph::new();
/// graph.add_edge(0, 1);
/// let mapping = map_to_grid(&graph, GridSize::new(1, 2)?)?;
/// let text = emit_events(&graph, &mapping)?.render();
/// assert!(text.contains("u begin DisconnectCellsAll\n"));
/// assert!(text.contains("u begin ConnectCells 0 0 0 1\n"));
/// # Ok::<(), topogrid_core::TopologyError>(())
/// ```
#[instrument(name = "events.emit", skip_all, fields(edges = graph.edge_count()))]
pub fn emit_events(graph: &Graph, mapping: &NodeToGridMapping) -> Result<CommandSequence> {
    if graph.is_directed() {
        warn!(
            "directed input: connections are emitted once per unordered pair and applied in both directions"
        );
    }
    let locate = |node: NodeId| {
        mapping
            .position(node)
            .ok_or(TopologyError::UnmappedNode { node })
    };
    let mut seen: BTreeSet<(GridPosition, GridPosition)> = BTreeSet::new();
    let mut commands = vec![Command::DisconnectAll];
    for (a, b) in graph.edges() {
        let from = locate(a)?;
        let to = locate(b)?;
        if seen.insert((from.min(to), from.max(to))) {
            commands.push(Command::Connect(from, to));
        }
    }
    debug!(connections = commands.len() - 1, "emitted grid events");
    Ok(CommandSequence {
        trigger: EventTrigger::default(),
        commands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::{
        graph::Orientation,
        grid::{GridSize, map_to_grid},
    };

    #[rstest]
    fn empty_graph_still_clears_connectivity() -> Result<()> {
        let graph = Graph::with_nodes([0]);
        let mapping = map_to_grid(&graph, GridSize::new(1, 1)?)?;
        let sequence = emit_events(&graph, &mapping)?;
        assert_eq!(sequence.commands(), &[Command::DisconnectAll]);
        assert_eq!(
            sequence.render(),
            format!("{DISCONNECT_BANNER}\nu begin DisconnectCellsAll\n{RECONNECT_BANNER}\n")
        );
        Ok(())
    }

    #[rstest]
    fn custom_trigger_prefixes_every_command() -> Result<()> {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        let mapping = map_to_grid(&graph, GridSize::new(2, 1)?)?;
        let text = emit_events(&graph, &mapping)?
            .with_trigger(EventTrigger::new("u 100"))
            .render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                DISCONNECT_BANNER,
                "u 100 DisconnectCellsAll",
                RECONNECT_BANNER,
                "u 100 ConnectCells 0 0 1 0",
            ]
        );
        Ok(())
    }

    #[rstest]
    fn edge_without_position_is_rejected() -> Result<()> {
        let mut small = Graph::new();
        small.add_edge(0, 1);
        let mapping = map_to_grid(&small, GridSize::new(2, 1)?)?;
        let mut larger = Graph::with_orientation(Orientation::Undirected);
        larger.add_edge(1, 2);
        assert_eq!(
            emit_events(&larger, &mapping),
            Err(TopologyError::UnmappedNode { node: 2 })
        );
        Ok(())
    }
}
