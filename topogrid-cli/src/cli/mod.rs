//! Command-line interface orchestration for topogrid.
//!
//! Commands cover batch generation of graph artifacts, conversion of graphs
//! into grid event sequences (singly or per replicate set), the
//! expected-births baseline and structural summaries.

mod batch;
mod commands;
mod output;
mod structures;

pub use batch::{BatchConfig, GraphRequest, Growth, ReplicateJob, plan, run_batch};
pub use commands::{
    BirthsArgs, Cli, CliError, Command, CommandReport, EventsArgs, EventsBatchArgs, GenerateArgs,
    GraphInputArgs, GridArgs, IsolatedArg, render_report, run_cli,
};
pub use output::{ArtifactRecord, ArtifactWriter, WriteOutcome};
pub use structures::{
    EventAssignment, StructureFile, assign_structures, collect_structures, run_events_batch,
};

#[cfg(test)]
mod tests;
