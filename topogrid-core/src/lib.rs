//! Topogrid core library.
//!
//! Builds spatial topologies for grid-based evolution experiments, persists
//! them as adjacency matrices or edge lists, places their nodes on a
//! simulation grid, emits the commands that impose them on the grid, and
//! computes the degree-weighted expected-births baseline.
//!
//! Every stochastic construction draws from a [`TopologyRng`] created from an
//! explicit seed inside the call, so the same seed always yields the same
//! graph regardless of what else runs in the process.

mod births;
mod error;
mod events;
mod format;
mod generators;
mod graph;
mod grid;
mod seeds;
mod summary;

pub use crate::{
    births::{
        BirthModel, ExpectedBirths, ExpectedBirthsTable, IsolatedNodePolicy, expected_births,
    },
    error::{FormatError, FormatErrorCode, Result, TopologyError, TopologyErrorCode},
    events::{Command, CommandSequence, EventTrigger, emit_events},
    format::{GraphFormat, read_edges, read_matrix, write_edges, write_matrix},
    generators::{
        BarabasiAlbertConfig, CavemanConfig, CliqueRingConfig, CometKiteConfig,
        ErdosRenyiConfig, Family, FamilyConfig, GeneratorParams, GeometricConfig,
        HierarchicalCliqueRingConfig, NodeCountConfig, RandomRegularConfig, RelaxedCavemanConfig,
        ToroidalLatticeConfig, WaxmanConfig, WellMixedConfig, WindmillConfig, add_random_nodes,
        generate,
    },
    graph::{Graph, NodeId, Orientation},
    grid::{GridPosition, GridSize, NodeToGridMapping, map_to_grid},
    seeds::{TopologyRng, derive_stream_seed, rng_from_seed},
    summary::{GraphSummary, summarize},
};
