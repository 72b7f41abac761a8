//! Batch topology generation driven by a JSON configuration file.
//!
//! The whole batch is planned and validated before any graph is built.
//! Replicates then run in parallel, each owning its random source.

use std::collections::BTreeSet;
use std::path::Path;

use rayon::prelude::*;
use serde::Deserialize;
use topogrid_core::{
    Family, FamilyConfig, GeneratorParams, GraphFormat, TopologyError, add_random_nodes,
    derive_stream_seed, rng_from_seed,
};
use tracing::{Span, debug, field, info, instrument, warn};

use super::commands::CliError;
use super::output::{ArtifactRecord, ArtifactWriter, WriteOutcome, ensure_dir, read_text};

/// Stream index reserved for the growth operator's random source.
const GROWTH_STREAM: u64 = 1;

/// Contents of a batch configuration file.
///
/// # Examples
/// ```
/// use topogrid_cli::cli::BatchConfig;
///
/// let config = BatchConfig::from_json(r#"{"graphs-to-generate": [{"graph": "star"}]}"#)?;
/// assert_eq!(config.graphs[0].count, 1);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Requests in file order.
    #[serde(rename = "graphs-to-generate")]
    pub graphs: Vec<GraphRequest>,
}

/// One entry of `graphs-to-generate`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphRequest {
    /// Family name, for example `clique-ring`.
    pub graph: String,
    /// Parameter overrides; missing keys take the family defaults.
    #[serde(default)]
    pub params: GeneratorParams,
    /// Number of replicates.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Artifact format.
    #[serde(default)]
    pub output_mode: GraphFormat,
    /// File name stem; defaults to the family name.
    #[serde(default)]
    pub output_id: Option<String>,
    /// Seed of replicate 0; replicate `i` uses `base_seed + i`.
    #[serde(default)]
    pub base_seed: Option<u64>,
    /// Grow each replicate to this many nodes after generation.
    #[serde(default)]
    pub increase_size_to: Option<usize>,
    /// Seed of the growth operator for replicate 0.
    #[serde(default)]
    pub growth_seed: Option<u64>,
}

const fn default_count() -> usize {
    1
}

/// Growth applied to a replicate after generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Growth {
    /// Final node count.
    pub target_size: usize,
    /// Seed of the growth operator's random source.
    pub seed: u64,
}

/// A fully validated replicate ready to build.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicateJob {
    /// Artifact file name, relative to the dump directory.
    pub file_name: String,
    /// Family parameters including the replicate seed.
    pub config: FamilyConfig,
    /// Artifact format.
    pub format: GraphFormat,
    /// Optional growth step.
    pub growth: Option<Growth>,
}

impl BatchConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    /// Returns the decode error when `text` is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads and parses the configuration at `path`.
    ///
    /// # Errors
    /// Returns [`CliError::Io`] when the file cannot be read and
    /// [`CliError::Config`] when it does not decode.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = read_text(path)?;
        Self::from_json(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl GraphRequest {
    fn output_stem(&self) -> &str {
        self.output_id.as_deref().unwrap_or(&self.graph)
    }

    /// Expands this request into validated replicate jobs.
    ///
    /// # Errors
    /// Returns [`TopologyError::UnknownFamily`] for an unregistered family and
    /// [`TopologyError::InvalidConfig`] or [`TopologyError::ParityViolation`]
    /// when any replicate's parameters are unusable.
    pub fn plan(&self) -> Result<Vec<ReplicateJob>, TopologyError> {
        let family: Family = self.graph.parse()?;
        if self.count == 0 {
            return Err(TopologyError::InvalidConfig {
                family: family.name(),
                parameter: "count",
                reason: "at least one replicate is required".to_owned(),
            });
        }
        if self.count > 1 && family.is_stochastic() && self.base_seed.is_none() {
            warn!(
                graph = %family,
                count = self.count,
                "no base_seed: every replicate reuses params.seed and will be identical"
            );
        }
        let base = family.resolve(&self.params)?;
        (0..self.count)
            .map(|replicate| self.replicate(&base, replicate as u64))
            .collect()
    }

    fn replicate(&self, base: &FamilyConfig, offset: u64) -> Result<ReplicateJob, TopologyError> {
        let replicate_seed = self.base_seed.map(|seed| seed.wrapping_add(offset));
        let config = match replicate_seed {
            Some(seed) => base.clone().with_seed(seed),
            None => base.clone(),
        };
        config.validate()?;

        let extension = self.output_mode.extension();
        let file_name = if self.count == 1 {
            format!("{}.{extension}", self.output_stem())
        } else {
            let file_id = replicate_seed.unwrap_or(offset);
            format!("{}_{file_id}.{extension}", self.output_stem())
        };

        let growth = match self.increase_size_to {
            Some(target_size) => Some(Growth {
                target_size,
                seed: self.growth_seed(&config, replicate_seed, offset)?,
            }),
            None => None,
        };

        Ok(ReplicateJob {
            file_name,
            config,
            format: self.output_mode,
            growth,
        })
    }

    fn growth_seed(
        &self,
        config: &FamilyConfig,
        replicate_seed: Option<u64>,
        offset: u64,
    ) -> Result<u64, TopologyError> {
        if let Some(seed) = self.growth_seed {
            return Ok(seed.wrapping_add(offset));
        }
        config
            .seed()
            .or(replicate_seed)
            .map(|seed| derive_stream_seed(seed, GROWTH_STREAM))
            .ok_or_else(|| TopologyError::InvalidConfig {
                family: config.family().name(),
                parameter: "growth_seed",
                reason: "growing a graph needs `growth_seed`, `base_seed` or a family seed"
                    .to_owned(),
            })
    }
}

impl ReplicateJob {
    #[instrument(
        name = "cli.replicate",
        skip_all,
        err,
        fields(file = %self.file_name, family = %self.config.family(), nodes = field::Empty)
    )]
    fn run(&self, dump_dir: &Path, writer: ArtifactWriter) -> Result<ArtifactRecord, CliError> {
        let path = dump_dir.join(&self.file_name);
        if writer.would_skip(&path) {
            return Ok(writer.skipped(&path));
        }
        let mut graph = self.config.build()?;
        if let Some(growth) = self.growth {
            let added = add_random_nodes(
                &mut graph,
                growth.target_size,
                &mut rng_from_seed(growth.seed),
            )?;
            debug!(added, "grew replicate");
        }
        Span::current().record("nodes", graph.node_count());
        debug!(edges = graph.edge_count(), "replicate built");
        writer.write(&path, &self.format.write(&graph))
    }
}

/// Expands and validates every request of `config`.
///
/// # Errors
/// Returns [`CliError::Request`] naming the first invalid entry, or
/// [`CliError::InvalidBatch`] when two replicates share an output name.
pub fn plan(config: &BatchConfig) -> Result<Vec<ReplicateJob>, CliError> {
    let mut names = BTreeSet::new();
    let mut jobs = Vec::new();
    for (index, request) in config.graphs.iter().enumerate() {
        let planned = request.plan().map_err(|source| CliError::Request {
            index,
            graph: request.graph.clone(),
            source,
        })?;
        for job in planned {
            if !names.insert(job.file_name.clone()) {
                return Err(CliError::InvalidBatch {
                    reason: format!(
                        "output `{}` is produced by more than one replicate",
                        job.file_name
                    ),
                });
            }
            jobs.push(job);
        }
    }
    Ok(jobs)
}

/// Generates every replicate of `config` into `dump_dir`.
///
/// # Errors
/// Returns the planning error before any file is written, otherwise the
/// first generation or I/O failure.
#[instrument(
    name = "cli.generate",
    skip_all,
    err,
    fields(dump_dir = %dump_dir.display(), requests = config.graphs.len(), jobs = field::Empty)
)]
pub fn run_batch(
    config: &BatchConfig,
    dump_dir: &Path,
    writer: ArtifactWriter,
) -> Result<Vec<ArtifactRecord>, CliError> {
    let jobs = plan(config)?;
    Span::current().record("jobs", jobs.len());
    ensure_dir(dump_dir)?;
    let records = jobs
        .par_iter()
        .map(|job| job.run(dump_dir, writer))
        .collect::<Result<Vec<_>, CliError>>()?;
    let written = records
        .iter()
        .filter(|record| record.outcome == WriteOutcome::Written)
        .count();
    info!(
        written,
        skipped = records.len() - written,
        "batch generation complete"
    );
    Ok(records)
}
