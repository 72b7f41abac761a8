//! Topology family registry and generation entry points.
//!
//! Family names are parsed into [`Family`] up front, parameters are decoded
//! into one typed record per family ([`FamilyConfig`]) and validated, and
//! only then is a graph built. Stochastic families draw from a
//! [`TopologyRng`] created from their seed inside the call.

mod cliques;
mod deterministic;
mod growth;
mod params;
mod random;

#[cfg(test)]
mod tests;

use std::{fmt, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    error::{Result, TopologyError},
    graph::Graph,
    seeds::{TopologyRng, rng_from_seed},
};

pub use growth::add_random_nodes;
pub use params::{
    BarabasiAlbertConfig, CavemanConfig, CliqueRingConfig, CometKiteConfig, ErdosRenyiConfig,
    GeometricConfig, HierarchicalCliqueRingConfig, NodeCountConfig, RandomRegularConfig,
    RelaxedCavemanConfig, ToroidalLatticeConfig, WaxmanConfig, WellMixedConfig, WindmillConfig,
};

use params::require_seed;

/// Raw parameter overrides as read from configuration.
pub type GeneratorParams = serde_json::Map<String, Value>;

/// A registered topology family.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Family {
    /// Complete graph.
    WellMixed,
    /// Wrap-around 2D lattice.
    ToroidalLattice,
    /// Path graph.
    LinearChain,
    /// Cycle graph.
    Cycle,
    /// Hub with leaves.
    Star,
    /// Hub joined to a rim cycle.
    Wheel,
    /// Cliques sharing one universal node.
    Windmill,
    /// Complete core with randomly grown tails.
    CometKite,
    /// Cliques joined cyclically.
    CliqueRing,
    /// Rings of clique rings.
    HierarchicalCliqueRing,
    /// Erdos-Renyi `G(n, p)`.
    RandomErdosRenyi,
    /// Barabasi-Albert preferential attachment.
    RandomBarabasiAlbert,
    /// Waxman spatial random graph.
    RandomWaxman,
    /// Random geometric graph.
    RandomGeometric,
    /// Random regular graph.
    RandomRegular,
    /// Caveman graph with caves linked in a ring.
    ConnectedCaveman,
    /// Caveman graph with randomly rewired edges.
    RelaxedCaveman,
}

impl Family {
    /// Every registered family, in listing order.
    pub const ALL: [Self; 17] = [
        Self::WellMixed,
        Self::ToroidalLattice,
        Self::LinearChain,
        Self::Cycle,
        Self::Star,
        Self::Wheel,
        Self::Windmill,
        Self::CometKite,
        Self::CliqueRing,
        Self::HierarchicalCliqueRing,
        Self::RandomErdosRenyi,
        Self::RandomBarabasiAlbert,
        Self::RandomWaxman,
        Self::RandomGeometric,
        Self::RandomRegular,
        Self::ConnectedCaveman,
        Self::RelaxedCaveman,
    ];

    /// Returns the kebab-case name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WellMixed => "well-mixed",
            Self::ToroidalLattice => "toroidal-lattice",
            Self::LinearChain => "linear-chain",
            Self::Cycle => "cycle",
            Self::Star => "star",
            Self::Wheel => "wheel",
            Self::Windmill => "windmill",
            Self::CometKite => "comet-kite",
            Self::CliqueRing => "clique-ring",
            Self::HierarchicalCliqueRing => "hierarchical-clique-ring",
            Self::RandomErdosRenyi => "random-erdos-renyi",
            Self::RandomBarabasiAlbert => "random-barabasi-albert",
            Self::RandomWaxman => "random-waxman",
            Self::RandomGeometric => "random-geometric",
            Self::RandomRegular => "random-regular",
            Self::ConnectedCaveman => "connected-caveman",
            Self::RelaxedCaveman => "relaxed-caveman",
        }
    }

    /// Returns whether the family needs a seed.
    #[must_use]
    pub const fn is_stochastic(self) -> bool {
        matches!(
            self,
            Self::CometKite
                | Self::CliqueRing
                | Self::HierarchicalCliqueRing
                | Self::RandomErdosRenyi
                | Self::RandomBarabasiAlbert
                | Self::RandomWaxman
                | Self::RandomGeometric
                | Self::RandomRegular
                | Self::RelaxedCaveman
        )
    }

    /// Decodes `params` into this family's typed configuration.
    ///
    /// Unknown keys are ignored and missing keys take the family defaults.
    /// The result is not yet validated.
    ///
    /// # Errors
    /// Returns [`TopologyError::InvalidConfig`] when a value has the wrong type.
    pub fn resolve(self, params: &GeneratorParams) -> Result<FamilyConfig> {
        Ok(match self {
            Self::WellMixed => FamilyConfig::WellMixed(decode(self, params)?),
            Self::ToroidalLattice => FamilyConfig::ToroidalLattice(decode(self, params)?),
            Self::LinearChain => FamilyConfig::LinearChain(decode(self, params)?),
            Self::Cycle => FamilyConfig::Cycle(decode(self, params)?),
            Self::Star => FamilyConfig::Star(decode(self, params)?),
            Self::Wheel => FamilyConfig::Wheel(decode(self, params)?),
            Self::Windmill => FamilyConfig::Windmill(decode(self, params)?),
            Self::CometKite => FamilyConfig::CometKite(decode(self, params)?),
            Self::CliqueRing => FamilyConfig::CliqueRing(decode(self, params)?),
            Self::HierarchicalCliqueRing => {
                FamilyConfig::HierarchicalCliqueRing(decode(self, params)?)
            }
            Self::RandomErdosRenyi => FamilyConfig::RandomErdosRenyi(decode(self, params)?),
            Self::RandomBarabasiAlbert => {
                FamilyConfig::RandomBarabasiAlbert(decode(self, params)?)
            }
            Self::RandomWaxman => FamilyConfig::RandomWaxman(decode(self, params)?),
            Self::RandomGeometric => FamilyConfig::RandomGeometric(decode(self, params)?),
            Self::RandomRegular => FamilyConfig::RandomRegular(decode(self, params)?),
            Self::ConnectedCaveman => FamilyConfig::ConnectedCaveman(decode(self, params)?),
            Self::RelaxedCaveman => FamilyConfig::RelaxedCaveman(decode(self, params)?),
        })
    }
}

fn decode<T: DeserializeOwned>(family: Family, params: &GeneratorParams) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|err| {
        TopologyError::invalid_config(family.name(), "params", err.to_string())
    })
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = TopologyError;

    fn from_str(name: &str) -> Result<Self> {
        // Older configuration files spell the lattice "torroidal".
        if name == "torroidal-lattice" {
            return Ok(Self::ToroidalLattice);
        }
        Self::ALL
            .into_iter()
            .find(|family| family.name() == name)
            .ok_or_else(|| TopologyError::UnknownFamily {
                name: name.to_owned(),
            })
    }
}

/// Typed parameters for one family.
///
/// Variants carry the record of the [`Family`] variant with the same name.
#[derive(Clone, Debug, PartialEq)]
pub enum FamilyConfig {
    /// See [`Family::WellMixed`].
    WellMixed(WellMixedConfig),
    /// See [`Family::ToroidalLattice`].
    ToroidalLattice(ToroidalLatticeConfig),
    /// See [`Family::LinearChain`].
    LinearChain(NodeCountConfig),
    /// See [`Family::Cycle`].
    Cycle(NodeCountConfig),
    /// See [`Family::Star`].
    Star(NodeCountConfig),
    /// See [`Family::Wheel`].
    Wheel(NodeCountConfig),
    /// See [`Family::Windmill`].
    Windmill(WindmillConfig),
    /// See [`Family::CometKite`].
    CometKite(CometKiteConfig),
    /// See [`Family::CliqueRing`].
    CliqueRing(CliqueRingConfig),
    /// See [`Family::HierarchicalCliqueRing`].
    HierarchicalCliqueRing(HierarchicalCliqueRingConfig),
    /// See [`Family::RandomErdosRenyi`].
    RandomErdosRenyi(ErdosRenyiConfig),
    /// See [`Family::RandomBarabasiAlbert`].
    RandomBarabasiAlbert(BarabasiAlbertConfig),
    /// See [`Family::RandomWaxman`].
    RandomWaxman(WaxmanConfig),
    /// See [`Family::RandomGeometric`].
    RandomGeometric(GeometricConfig),
    /// See [`Family::RandomRegular`].
    RandomRegular(RandomRegularConfig),
    /// See [`Family::ConnectedCaveman`].
    ConnectedCaveman(CavemanConfig),
    /// See [`Family::RelaxedCaveman`].
    RelaxedCaveman(RelaxedCavemanConfig),
}

impl FamilyConfig {
    /// Returns the family these parameters belong to.
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::WellMixed(_) => Family::WellMixed,
            Self::ToroidalLattice(_) => Family::ToroidalLattice,
            Self::LinearChain(_) => Family::LinearChain,
            Self::Cycle(_) => Family::Cycle,
            Self::Star(_) => Family::Star,
            Self::Wheel(_) => Family::Wheel,
            Self::Windmill(_) => Family::Windmill,
            Self::CometKite(_) => Family::CometKite,
            Self::CliqueRing(_) => Family::CliqueRing,
            Self::HierarchicalCliqueRing(_) => Family::HierarchicalCliqueRing,
            Self::RandomErdosRenyi(_) => Family::RandomErdosRenyi,
            Self::RandomBarabasiAlbert(_) => Family::RandomBarabasiAlbert,
            Self::RandomWaxman(_) => Family::RandomWaxman,
            Self::RandomGeometric(_) => Family::RandomGeometric,
            Self::RandomRegular(_) => Family::RandomRegular,
            Self::ConnectedCaveman(_) => Family::ConnectedCaveman,
            Self::RelaxedCaveman(_) => Family::RelaxedCaveman,
        }
    }

    /// Returns the configured seed, if the family takes one.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        match self {
            Self::CometKite(c) => c.seed,
            Self::CliqueRing(c) => c.seed,
            Self::HierarchicalCliqueRing(c) => c.seed,
            Self::RandomErdosRenyi(c) => c.seed,
            Self::RandomBarabasiAlbert(c) => c.seed,
            Self::RandomWaxman(c) => c.seed,
            Self::RandomGeometric(c) => c.seed,
            Self::RandomRegular(c) => c.seed,
            Self::RelaxedCaveman(c) => c.seed,
            _ => None,
        }
    }

    /// Replaces the seed of a stochastic family; deterministic families are
    /// returned unchanged.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        match &mut self {
            Self::CometKite(c) => c.seed = Some(seed),
            Self::CliqueRing(c) => c.seed = Some(seed),
            Self::HierarchicalCliqueRing(c) => c.seed = Some(seed),
            Self::RandomErdosRenyi(c) => c.seed = Some(seed),
            Self::RandomBarabasiAlbert(c) => c.seed = Some(seed),
            Self::RandomWaxman(c) => c.seed = Some(seed),
            Self::RandomGeometric(c) => c.seed = Some(seed),
            Self::RandomRegular(c) => c.seed = Some(seed),
            Self::RelaxedCaveman(c) => c.seed = Some(seed),
            _ => {}
        }
        self
    }

    /// Checks every parameter, including the seed of stochastic families.
    ///
    /// # Errors
    /// Returns [`TopologyError::InvalidConfig`] or
    /// [`TopologyError::ParityViolation`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.validate_structure()?;
        let family = self.family();
        if family.is_stochastic() {
            require_seed(family.name(), self.seed())?;
        }
        Ok(())
    }

    fn validate_structure(&self) -> Result<()> {
        match self {
            Self::ToroidalLattice(c) => c.validate(),
            Self::Windmill(c) => c.validate(),
            Self::CometKite(c) => c.validate(),
            Self::CliqueRing(c) => c.validate(),
            Self::HierarchicalCliqueRing(c) => c.validate(),
            Self::RandomErdosRenyi(c) => c.validate(),
            Self::RandomBarabasiAlbert(c) => c.validate(),
            Self::RandomWaxman(c) => c.validate(),
            Self::RandomGeometric(c) => c.validate(),
            Self::RandomRegular(c) => c.validate(),
            Self::ConnectedCaveman(c) => c.validate(),
            Self::RelaxedCaveman(c) => c.validate(),
            Self::WellMixed(_)
            | Self::LinearChain(_)
            | Self::Cycle(_)
            | Self::Star(_)
            | Self::Wheel(_) => Ok(()),
        }
    }

    /// Validates the parameters and builds the graph from the configured seed.
    ///
    /// # Errors
    /// Returns the validation error, or [`TopologyError::GenerationFailed`]
    /// when a randomised construction exhausts its restarts.
    pub fn build(&self) -> Result<Graph> {
        self.validate()?;
        // Deterministic families never draw from this source.
        let mut rng = rng_from_seed(self.seed().unwrap_or_default());
        self.construct(&mut rng)
    }

    /// Builds the graph drawing from `rng` instead of the configured seed.
    ///
    /// # Errors
    /// As for [`FamilyConfig::build`], except that a missing seed is accepted.
    pub fn build_with(&self, rng: &mut TopologyRng) -> Result<Graph> {
        self.validate_structure()?;
        self.construct(rng)
    }

    fn construct(&self, rng: &mut TopologyRng) -> Result<Graph> {
        Ok(match self {
            Self::WellMixed(c) => deterministic::complete(c.nodes),
            Self::ToroidalLattice(c) => deterministic::toroidal_lattice(c),
            Self::LinearChain(c) => deterministic::linear_chain(c),
            Self::Cycle(c) => deterministic::cycle(c),
            Self::Star(c) => deterministic::star(c),
            Self::Wheel(c) => deterministic::wheel(c),
            Self::Windmill(c) => deterministic::windmill(c),
            Self::CometKite(c) => cliques::comet_kite(c, rng),
            Self::CliqueRing(c) => cliques::clique_ring(c, rng),
            Self::HierarchicalCliqueRing(c) => {
                cliques::hierarchical_clique_ring(c, c.base_ring_count()?, rng)
            }
            Self::RandomErdosRenyi(c) => random::erdos_renyi(c, rng),
            Self::RandomBarabasiAlbert(c) => random::barabasi_albert(c, rng),
            Self::RandomWaxman(c) => random::waxman(c, rng),
            Self::RandomGeometric(c) => random::geometric(c, rng),
            Self::RandomRegular(c) => random::random_regular(c, rng)?,
            Self::ConnectedCaveman(c) => deterministic::connected_caveman(c),
            Self::RelaxedCaveman(c) => cliques::relaxed_caveman(c, rng),
        })
    }
}

/// Builds one graph of the named family.
///
/// # Errors
/// Returns [`TopologyError::UnknownFamily`] for an unregistered name,
/// [`TopologyError::InvalidConfig`] when parameters cannot be resolved, and
/// any construction error raised by the family.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use topogrid_core::{GeneratorParams, generate};
///
/// let params: GeneratorParams = json!({ "nodes": 4 })
///     .as_object()
///     .cloned()
///     .unwrap_or_default();
/// let chain = generate("linear-chain", &params)?;
/// assert_eq!(chain.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 3)]);
/// # Ok::<(), topogrid_core::TopologyError>(())
/// ```
#[instrument(name = "generator.generate", skip(params), err)]
pub fn generate(family_name: &str, params: &GeneratorParams) -> Result<Graph> {
    let family: Family = family_name.parse()?;
    let graph = family.resolve(params)?.build()?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "generated topology"
    );
    Ok(graph)
}
