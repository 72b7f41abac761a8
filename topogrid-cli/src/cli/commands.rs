//! Command implementations and argument parsing for the topogrid CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use topogrid_core::{
    BirthModel, EventTrigger, Family, FormatErrorCode, Graph, GraphFormat, GridSize,
    IsolatedNodePolicy, Orientation, TopologyError, TopologyErrorCode, emit_events, map_to_grid,
    summarize,
};
use tracing::{Span, field, info, instrument};

use super::batch::{BatchConfig, run_batch};
use super::output::{ArtifactRecord, ArtifactWriter, WriteOutcome, ensure_dir, read_text};
use super::structures::run_events_batch;

const DEFAULT_WORLD_SIZE: usize = 10;
const DEFAULT_TRIGGER: &str = "u begin";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "topogrid",
    about = "Generate spatial topologies and impose them on simulation grids."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate graph files from a JSON batch configuration.
    Generate(GenerateArgs),
    /// List the registered topology families.
    List,
    /// Convert one graph file into a grid event command sequence.
    Events(EventsArgs),
    /// Write one event file per replicate from a set of structure files.
    EventsBatch(EventsBatchArgs),
    /// Compute the expected-births baseline of a graph.
    Births(BirthsArgs),
    /// Print structural statistics of a graph as CSV.
    Summarize(GraphInputArgs),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// JSON file with a `graphs-to-generate` list.
    #[arg(long, default_value = "graphs.json")]
    pub config: PathBuf,

    /// Directory receiving the graph files.
    #[arg(long = "dump-dir", default_value = ".")]
    pub dump_dir: PathBuf,

    /// Regenerate and replace files that already exist.
    #[arg(short = 'o', long)]
    pub overwrite: bool,
}

/// A graph file to read.
#[derive(Debug, Args, Clone)]
pub struct GraphInputArgs {
    /// Path of the graph file.
    #[arg(long = "graph-file")]
    pub graph_file: PathBuf,

    /// Format of the graph file (`matrix` or `edges`).
    #[arg(long = "graph-format", default_value_t = GraphFormat::Matrix)]
    pub graph_format: GraphFormat,

    /// Read the graph as directed.
    #[arg(long)]
    pub directed: bool,
}

impl GraphInputArgs {
    const fn orientation(&self) -> Orientation {
        if self.directed {
            Orientation::Directed
        } else {
            Orientation::Undirected
        }
    }
}

/// Simulation grid and command trigger.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Grid width.
    #[arg(short = 'x', long = "world-x", default_value_t = DEFAULT_WORLD_SIZE)]
    pub world_x: usize,

    /// Grid height.
    #[arg(short = 'y', long = "world-y", default_value_t = DEFAULT_WORLD_SIZE)]
    pub world_y: usize,

    /// Prefix placed before every command.
    #[arg(long, default_value = DEFAULT_TRIGGER)]
    pub trigger: String,
}

impl GridArgs {
    pub(super) fn grid(&self) -> Result<GridSize, CliError> {
        Ok(GridSize::new(self.world_x, self.world_y)?)
    }

    pub(super) fn trigger(&self) -> EventTrigger {
        EventTrigger::new(self.trigger.as_str())
    }
}

/// Options accepted by the `events` command.
#[derive(Debug, Args, Clone)]
pub struct EventsArgs {
    /// Graph to convert.
    #[command(flatten)]
    pub input: GraphInputArgs,

    /// Grid the graph is imposed on.
    #[command(flatten)]
    pub grid: GridArgs,

    /// Directory receiving the event file.
    #[arg(long = "dump-dir", default_value = ".")]
    pub dump_dir: PathBuf,

    /// Name of the event file.
    #[arg(short = 'o', long = "out-name", default_value = "event_cmds.dat")]
    pub out_name: String,

    /// Also write the `node,x,y` placement table to this path.
    #[arg(long = "location-map")]
    pub location_map: Option<PathBuf>,

    /// Replace files that already exist.
    #[arg(long)]
    pub overwrite: bool,
}

/// Options accepted by the `events-batch` command.
#[derive(Debug, Args, Clone)]
pub struct EventsBatchArgs {
    /// Directory holding `<prefix>_<n>.mat` structure files.
    #[arg(long = "structures-dir")]
    pub structures_dir: PathBuf,

    /// Structure name shared by the files.
    #[arg(long)]
    pub prefix: String,

    /// Number of replicates needing an event file.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub replicates: u64,

    /// Grid the structures are imposed on.
    #[command(flatten)]
    pub grid: GridArgs,

    /// Directory receiving the event files.
    #[arg(long = "events-dir", default_value = ".")]
    pub events_dir: PathBuf,

    /// Replace files that already exist.
    #[arg(long)]
    pub overwrite: bool,
}

/// Options accepted by the `births` command.
#[derive(Debug, Args, Clone)]
pub struct BirthsArgs {
    /// Graph to analyse.
    #[command(flatten)]
    pub input: GraphInputArgs,

    /// Leave out each node's contribution to itself.
    #[arg(long = "no-self-replacement")]
    pub no_self_replacement: bool,

    /// Treatment of nodes without neighbours.
    #[arg(long, value_enum, default_value_t = IsolatedArg::Reject)]
    pub isolated: IsolatedArg,

    /// Write the table to this file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Replace the output file if it exists.
    #[arg(long)]
    pub overwrite: bool,
}

/// Isolated-node policies selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IsolatedArg {
    /// Fail on the first isolated node.
    Reject,
    /// Give isolated nodes zero expected births.
    ZeroWeight,
}

impl From<IsolatedArg> for IsolatedNodePolicy {
    fn from(value: IsolatedArg) -> Self {
        match value {
            IsolatedArg::Reject => Self::Reject,
            IsolatedArg::ZeroWeight => Self::ZeroWeight,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed.
    #[error("I/O failed for `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The batch configuration was not valid JSON of the expected shape.
    #[error("failed to parse batch configuration `{path}`: {source}")]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
    /// The batch configuration was well formed but unusable.
    #[error("invalid batch configuration: {reason}")]
    InvalidBatch {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// One entry of the batch configuration failed validation.
    #[error("graphs-to-generate[{index}] (`{graph}`): {source}")]
    Request {
        /// Zero-based position of the entry.
        index: usize,
        /// Family name given by the entry.
        graph: String,
        /// Validation failure.
        #[source]
        source: TopologyError,
    },
    /// A graph file could not be decoded.
    #[error("failed to load graph `{path}`: {source}")]
    Graph {
        /// Graph file.
        path: PathBuf,
        /// Decode failure.
        #[source]
        source: TopologyError,
    },
    /// Fewer structure files exist than replicates were requested.
    #[error(
        "found {found} structure files for `{prefix}` but {requested} replicates were requested"
    )]
    InsufficientStructures {
        /// Structure name.
        prefix: String,
        /// Number of matching files.
        found: usize,
        /// Number of replicates requested.
        requested: u64,
    },
    /// Core topology operation failed.
    #[error(transparent)]
    Core(#[from] TopologyError),
}

impl CliError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the underlying topology error, if any.
    #[must_use]
    pub const fn topology_error(&self) -> Option<&TopologyError> {
        match self {
            Self::Core(source) | Self::Request { source, .. } | Self::Graph { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Returns the stable code of the underlying topology error, if any.
    #[must_use]
    pub fn topology_code(&self) -> Option<TopologyErrorCode> {
        self.topology_error().map(TopologyError::code)
    }

    /// Returns the stable parse-failure code when a graph file was malformed.
    #[must_use]
    pub fn format_code(&self) -> Option<FormatErrorCode> {
        self.topology_error().and_then(TopologyError::format_code)
    }
}

/// Outcome of executing a CLI command, rendered by [`render_report`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReport {
    /// Registered topology families.
    Families(Vec<Family>),
    /// Files written or kept by the command.
    Artifacts(Vec<ArtifactRecord>),
    /// CSV table destined for stdout.
    Csv(String),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, validating parameters, or
/// writing artifacts fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use topogrid_cli::cli::{Cli, Command, CommandReport, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let report = run_cli(Cli { command: Command::List })?;
/// assert!(matches!(report, CommandReport::Families(families) if families.len() == 17));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<CommandReport, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Generate(args) => {
            span.record("command", "generate");
            run_generate(&args)
        }
        Command::List => {
            span.record("command", "list");
            Ok(CommandReport::Families(Family::ALL.to_vec()))
        }
        Command::Events(args) => {
            span.record("command", "events");
            run_events(&args)
        }
        Command::EventsBatch(args) => {
            span.record("command", "events-batch");
            let records = run_events_batch(
                &args.structures_dir,
                &args.prefix,
                args.replicates,
                &args.grid,
                &args.events_dir,
                ArtifactWriter::new(args.overwrite),
            )?;
            Ok(CommandReport::Artifacts(records))
        }
        Command::Births(args) => {
            span.record("command", "births");
            run_births(&args)
        }
        Command::Summarize(args) => {
            span.record("command", "summarize");
            let graph = read_graph(&args)?;
            Ok(CommandReport::Csv(summarize(&graph).to_csv()))
        }
    }
}

fn run_generate(args: &GenerateArgs) -> Result<CommandReport, CliError> {
    let config = BatchConfig::load(&args.config)?;
    let records = run_batch(&config, &args.dump_dir, ArtifactWriter::new(args.overwrite))?;
    Ok(CommandReport::Artifacts(records))
}

#[instrument(
    name = "cli.events",
    err,
    skip(args),
    fields(graph = %args.input.graph_file.display(), connections = field::Empty)
)]
pub(super) fn run_events(args: &EventsArgs) -> Result<CommandReport, CliError> {
    let graph = read_graph(&args.input)?;
    let mapping = map_to_grid(&graph, args.grid.grid()?)?;
    let sequence = emit_events(&graph, &mapping)?.with_trigger(args.grid.trigger());
    Span::current().record("connections", sequence.connection_count());

    let writer = ArtifactWriter::new(args.overwrite);
    ensure_dir(&args.dump_dir)?;
    let mut records = vec![writer.write(&args.dump_dir.join(&args.out_name), &sequence.render())?];
    if let Some(path) = &args.location_map {
        records.push(writer.write(path, &mapping.to_csv())?);
    }
    Ok(CommandReport::Artifacts(records))
}

#[instrument(
    name = "cli.births",
    err,
    skip(args),
    fields(graph = %args.input.graph_file.display())
)]
pub(super) fn run_births(args: &BirthsArgs) -> Result<CommandReport, CliError> {
    let graph = read_graph(&args.input)?;
    let table = BirthModel::new(!args.no_self_replacement)
        .with_isolated_nodes(args.isolated.into())
        .compute(&graph)?;
    info!(nodes = table.len(), total = table.total_weight(), "expected births computed");
    let csv = table.to_csv();
    match &args.output {
        Some(path) => {
            let record = ArtifactWriter::new(args.overwrite).write(path, &csv)?;
            Ok(CommandReport::Artifacts(vec![record]))
        }
        None => Ok(CommandReport::Csv(csv)),
    }
}

/// Reads the graph named by `input`.
pub(super) fn read_graph(input: &GraphInputArgs) -> Result<Graph, CliError> {
    let text = read_text(&input.graph_file)?;
    input
        .graph_format
        .read(&text, input.orientation())
        .map_err(|source| CliError::Graph {
            path: input.graph_file.clone(),
            source,
        })
}

/// Renders `report` to `writer`.
///
/// Families are listed one per line, artifacts as `written` or `skipped`
/// followed by a tab and the path, and CSV tables verbatim.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use topogrid_cli::cli::{CommandReport, render_report};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut buffer = Vec::new();
/// render_report(&CommandReport::Csv("node,x,y\n".into()), &mut buffer)?;
/// assert_eq!(buffer, b"node,x,y\n");
/// # Ok(())
/// # }
/// ```
pub fn render_report(report: &CommandReport, mut writer: impl Write) -> io::Result<()> {
    match report {
        CommandReport::Families(families) => {
            writeln!(writer, "Available graph generators:")?;
            for family in families {
                writeln!(writer, "  - {family}")?;
            }
        }
        CommandReport::Artifacts(records) => {
            for record in records {
                let label = match record.outcome {
                    WriteOutcome::Written => "written",
                    WriteOutcome::SkippedExisting => "skipped",
                };
                writeln!(writer, "{label}\t{}", record.path.display())?;
            }
        }
        CommandReport::Csv(csv) => writer.write_all(csv.as_bytes())?,
    }
    Ok(())
}
