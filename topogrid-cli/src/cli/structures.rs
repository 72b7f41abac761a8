//! Event files for replicate sets of pre-generated structure files.
//!
//! Structure files follow the `generate` naming scheme: `<prefix>_<n>.mat`
//! for numbered replicates, or a bare `<prefix>.mat` shared by every run.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use topogrid_core::{EventTrigger, GridSize, emit_events, map_to_grid, read_matrix};
use tracing::{info, instrument, warn};

use super::commands::{CliError, GridArgs};
use super::output::{ArtifactRecord, ArtifactWriter, ensure_dir, read_text};

const STRUCTURE_EXTENSION: &str = ".mat";

/// A structure file found for a prefix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructureFile {
    /// Location of the adjacency matrix.
    pub path: PathBuf,
    /// Trailing `_<n>` of the file stem; `None` for a bare `<prefix>.mat`.
    pub index: Option<u64>,
}

/// An event file to write and the structure it encodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventAssignment {
    /// Event file name, relative to the events directory.
    pub file_name: String,
    /// Structure imposed by the event file.
    pub structure: StructureFile,
}

fn parse_structure_name(name: &str, prefix: &str) -> Option<Option<u64>> {
    let stem = name.strip_suffix(STRUCTURE_EXTENSION)?;
    if stem == prefix {
        return Some(None);
    }
    stem.strip_prefix(prefix)?
        .strip_prefix('_')?
        .parse::<u64>()
        .ok()
        .map(Some)
}

/// Lists the structure files in `dir` belonging to `prefix`.
///
/// Numbered files are returned sorted by their index. A bare `<prefix>.mat`
/// is returned only when no numbered file exists.
///
/// # Errors
/// Returns [`CliError::Io`] when the directory cannot be read.
pub fn collect_structures(dir: &Path, prefix: &str) -> Result<Vec<StructureFile>, CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::io(dir, source))?;
    let mut numbered = Vec::new();
    let mut bare = None;
    for entry in entries {
        let entry = entry.map_err(|source| CliError::io(dir, source))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        match parse_structure_name(name, prefix) {
            Some(Some(index)) => numbered.push(StructureFile {
                path: entry.path(),
                index: Some(index),
            }),
            Some(None) => {
                bare = Some(StructureFile {
                    path: entry.path(),
                    index: None,
                });
            }
            None => {}
        }
    }
    if numbered.is_empty() {
        return Ok(bare.into_iter().collect());
    }
    numbered.sort_by_key(|file| file.index);
    Ok(numbered)
}

/// Assigns structure files to replicate event files.
///
/// A single structure is shared through `events_<prefix>.cfg`. Otherwise the
/// first `replicates` files map to `events_<prefix>_<i>.cfg`.
///
/// # Errors
/// Returns [`CliError::InsufficientStructures`] when there are no files, or
/// several files but fewer than `replicates`.
pub fn assign_structures(
    prefix: &str,
    structures: Vec<StructureFile>,
    replicates: u64,
) -> Result<Vec<EventAssignment>, CliError> {
    let found = structures.len();
    let insufficient = || CliError::InsufficientStructures {
        prefix: prefix.to_owned(),
        found,
        requested: replicates,
    };
    if found == 0 {
        return Err(insufficient());
    }
    if found == 1 {
        return Ok(structures
            .into_iter()
            .map(|structure| EventAssignment {
                file_name: format!("events_{prefix}.cfg"),
                structure,
            })
            .collect());
    }
    let wanted = usize::try_from(replicates).map_err(|_| insufficient())?;
    if found < wanted {
        return Err(insufficient());
    }
    Ok(structures
        .into_iter()
        .take(wanted)
        .zip(0_u64..)
        .map(|(structure, replicate)| {
            if structure.index != Some(replicate) {
                warn!(
                    replicate,
                    path = %structure.path.display(),
                    "structure index does not match the replicate it serves"
                );
            }
            EventAssignment {
                file_name: format!("events_{prefix}_{replicate}.cfg"),
                structure,
            }
        })
        .collect())
}

fn render_assignment(
    assignment: &EventAssignment,
    grid: GridSize,
    trigger: &EventTrigger,
) -> Result<String, CliError> {
    let path = &assignment.structure.path;
    let graph = read_matrix(&read_text(path)?).map_err(|source| CliError::Graph {
        path: path.clone(),
        source,
    })?;
    let mapping = map_to_grid(&graph, grid)?;
    let sequence = emit_events(&graph, &mapping)?.with_trigger(trigger.clone());
    Ok(sequence.render())
}

/// Writes one event file per replicate of the `prefix` structure set.
///
/// # Errors
/// Returns [`CliError::InsufficientStructures`] when the set is too small,
/// and any read, mapping, or write failure.
#[instrument(
    name = "cli.events_batch",
    skip_all,
    err,
    fields(
        prefix = %prefix,
        replicates = replicates,
        structures_dir = %structures_dir.display(),
        events_dir = %events_dir.display()
    )
)]
pub fn run_events_batch(
    structures_dir: &Path,
    prefix: &str,
    replicates: u64,
    grid_args: &GridArgs,
    events_dir: &Path,
    writer: ArtifactWriter,
) -> Result<Vec<ArtifactRecord>, CliError> {
    let grid = grid_args.grid()?;
    let trigger = grid_args.trigger();
    let structures = collect_structures(structures_dir, prefix)?;
    let assignments = assign_structures(prefix, structures, replicates)?;
    ensure_dir(events_dir)?;
    let records = assignments
        .par_iter()
        .map(|assignment| {
            let path = events_dir.join(&assignment.file_name);
            if writer.would_skip(&path) {
                return Ok(writer.skipped(&path));
            }
            let text = render_assignment(assignment, grid, &trigger)?;
            writer.write(&path, &text)
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    info!(event_files = records.len(), "event files prepared");
    Ok(records)
}
