//! Typed parameter records, one per topology family.
//!
//! Each record states its defaults exactly once (in its `Default` impl) and
//! knows how to validate itself before any construction starts. Records are
//! deserialised from JSON parameter maps; unknown keys are ignored and
//! missing keys fall back to the defaults.

use serde::Deserialize;

use crate::error::{Result, TopologyError};

fn require_at_least(
    family: &'static str,
    parameter: &'static str,
    value: usize,
    minimum: usize,
) -> Result<()> {
    if value < minimum {
        return Err(TopologyError::invalid_config(
            family,
            parameter,
            format!("must be at least {minimum} (got {value})"),
        ));
    }
    Ok(())
}

fn require_probability(family: &'static str, parameter: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TopologyError::invalid_config(
            family,
            parameter,
            format!("must be a probability in [0, 1] (got {value})"),
        ));
    }
    Ok(())
}

fn checked_total(
    family: &'static str,
    parameter: &'static str,
    total: Option<usize>,
) -> Result<usize> {
    total.ok_or_else(|| {
        TopologyError::invalid_config(family, parameter, "node count overflows the node id space")
    })
}

pub(crate) fn require_seed(family: &'static str, seed: Option<u64>) -> Result<u64> {
    seed.ok_or_else(|| {
        TopologyError::invalid_config(
            family,
            "seed",
            "stochastic families need an explicit seed for reproducible output",
        )
    })
}

/// Complete graph parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WellMixedConfig {
    /// Number of nodes.
    pub nodes: usize,
}

impl Default for WellMixedConfig {
    fn default() -> Self {
        Self { nodes: 100 }
    }
}

/// Wrap-around lattice parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToroidalLatticeConfig {
    /// Number of columns.
    pub graph_width: usize,
    /// Number of rows.
    pub graph_height: usize,
}

impl Default for ToroidalLatticeConfig {
    fn default() -> Self {
        Self {
            graph_width: 10,
            graph_height: 10,
        }
    }
}

impl ToroidalLatticeConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("toroidal-lattice", "graph_width", self.graph_width, 1)?;
        require_at_least("toroidal-lattice", "graph_height", self.graph_height, 1)?;
        checked_total(
            "toroidal-lattice",
            "graph_height",
            self.graph_width.checked_mul(self.graph_height),
        )
        .map(|_| ())
    }
}

/// Parameters shared by the single-size families (chain, cycle, star, wheel).
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeCountConfig {
    /// Total number of nodes, hub included where the family has one.
    pub nodes: usize,
}

impl Default for NodeCountConfig {
    fn default() -> Self {
        Self { nodes: 100 }
    }
}

/// Windmill parameters: cliques sharing one universal node.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindmillConfig {
    /// Number of blades.
    pub cliques: usize,
    /// Size of each blade, universal node included.
    pub clique_size: usize,
}

impl Default for WindmillConfig {
    fn default() -> Self {
        Self {
            cliques: 11,
            clique_size: 10,
        }
    }
}

impl WindmillConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("windmill", "cliques", self.cliques, 1)?;
        require_at_least("windmill", "clique_size", self.clique_size, 2)?;
        let total = (self.clique_size - 1)
            .checked_mul(self.cliques)
            .and_then(|blades| blades.checked_add(1));
        checked_total("windmill", "cliques", total).map(|_| ())
    }
}

/// Comet-kite parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CometKiteConfig {
    /// Size of the complete core.
    pub core_size: usize,
    /// Number of leaves attached to core node 0.
    pub num_tails: usize,
    /// Extra nodes attached one by one to random tail nodes.
    pub additional_tail_nodes: usize,
    /// Seed for the tail attachment draws.
    pub seed: Option<u64>,
}

impl Default for CometKiteConfig {
    fn default() -> Self {
        Self {
            core_size: 40,
            num_tails: 20,
            additional_tail_nodes: 40,
            seed: None,
        }
    }
}

impl CometKiteConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        let total = self
            .core_size
            .checked_add(self.num_tails)
            .and_then(|n| n.checked_add(self.additional_tail_nodes));
        checked_total("comet-kite", "additional_tail_nodes", total).map(|_| ())
    }
}

/// Ring-of-cliques parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliqueRingConfig {
    /// Size of every clique.
    pub clique_size: usize,
    /// Number of cliques in the ring.
    pub clique_count: usize,
    /// Length of the chain joining consecutive cliques; 0 links them directly.
    pub nodes_between_cliques: usize,
    /// Seed for the link endpoint draws.
    pub seed: Option<u64>,
}

impl Default for CliqueRingConfig {
    fn default() -> Self {
        Self {
            clique_size: 8,
            clique_count: 10,
            nodes_between_cliques: 2,
            seed: None,
        }
    }
}

impl CliqueRingConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("clique-ring", "clique_size", self.clique_size, 1)?;
        require_at_least("clique-ring", "clique_count", self.clique_count, 1)?;
        self.node_total().map(|_| ())
    }

    /// Clique members plus the chain nodes of every link.
    pub(crate) fn node_total(&self) -> Result<usize> {
        let total = self
            .clique_size
            .checked_add(self.nodes_between_cliques)
            .and_then(|per_clique| per_clique.checked_mul(self.clique_count));
        checked_total("clique-ring", "clique_count", total)
    }
}

/// Hierarchical ring-of-rings parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HierarchicalCliqueRingConfig {
    /// Size of every base clique.
    pub clique_size: usize,
    /// Number of members grouped into one ring at every layer.
    pub community_count: usize,
    /// Number of merge layers above the base rings.
    pub layers: u32,
    /// Length of the chains joining ring members.
    pub nodes_between_communities: usize,
    /// Seed for every link endpoint draw.
    pub seed: Option<u64>,
}

impl Default for HierarchicalCliqueRingConfig {
    fn default() -> Self {
        Self {
            clique_size: 8,
            community_count: 10,
            layers: 2,
            nodes_between_communities: 2,
            seed: None,
        }
    }
}

impl HierarchicalCliqueRingConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        const FAMILY: &str = "hierarchical-clique-ring";
        require_at_least(FAMILY, "clique_size", self.clique_size, 1)?;
        require_at_least(FAMILY, "community_count", self.community_count, 1)?;
        self.node_total().map(|_| ())
    }

    /// Nodes of the finished hierarchy: base rings plus every merge chain.
    ///
    /// Each merge links every member of a group once, so a layer with `r`
    /// rings adds `r * nodes_between_communities` chain nodes.
    pub(crate) fn node_total(&self) -> Result<usize> {
        const FAMILY: &str = "hierarchical-clique-ring";
        let ring = CliqueRingConfig {
            clique_size: self.clique_size,
            clique_count: self.community_count,
            nodes_between_cliques: self.nodes_between_communities,
            seed: None,
        };
        let per_ring = ring.node_total().map_err(|_| {
            TopologyError::invalid_config(
                FAMILY,
                "clique_size",
                "node count overflows the node id space",
            )
        })?;
        let mut rings = self.base_ring_count()?;
        let mut total = checked_total(FAMILY, "layers", rings.checked_mul(per_ring))?;
        while rings > 1 {
            let chains = rings.checked_mul(self.nodes_between_communities);
            total = checked_total(FAMILY, "layers", chains.and_then(|n| total.checked_add(n)))?;
            rings = rings.div_ceil(self.community_count);
        }
        Ok(total)
    }

    pub(crate) fn base_ring_count(&self) -> Result<usize> {
        self.community_count.checked_pow(self.layers).ok_or_else(|| {
            TopologyError::invalid_config(
                "hierarchical-clique-ring",
                "layers",
                format!(
                    "{} communities over {} layers overflows the node id space",
                    self.community_count, self.layers
                ),
            )
        })
    }
}

/// Erdos-Renyi `G(n, p)` parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErdosRenyiConfig {
    /// Number of nodes.
    pub nodes: usize,
    /// Independent probability of each edge.
    pub edge_prob: f64,
    /// Seed for the edge draws.
    pub seed: Option<u64>,
}

impl Default for ErdosRenyiConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            edge_prob: 0.05,
            seed: None,
        }
    }
}

impl ErdosRenyiConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_probability("random-erdos-renyi", "edge_prob", self.edge_prob)
    }
}

/// Barabasi-Albert preferential attachment parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarabasiAlbertConfig {
    /// Number of nodes.
    pub nodes: usize,
    /// Edges attaching each new node to existing nodes.
    pub edges: usize,
    /// Seed for target selection.
    pub seed: Option<u64>,
}

impl Default for BarabasiAlbertConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            edges: 10,
            seed: None,
        }
    }
}

impl BarabasiAlbertConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("random-barabasi-albert", "edges", self.edges, 1)?;
        if self.edges >= self.nodes {
            return Err(TopologyError::invalid_config(
                "random-barabasi-albert",
                "edges",
                format!("must be below nodes ({} >= {})", self.edges, self.nodes),
            ));
        }
        Ok(())
    }
}

/// Waxman spatial random graph parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaxmanConfig {
    /// Number of nodes.
    pub nodes: usize,
    /// Overall edge density scale.
    pub beta: f64,
    /// Distance decay relative to the largest pairwise distance.
    pub alpha: f64,
    /// Seed for positions and edge draws.
    pub seed: Option<u64>,
}

impl Default for WaxmanConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            beta: 0.4,
            alpha: 0.2,
            seed: None,
        }
    }
}

impl WaxmanConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_probability("random-waxman", "beta", self.beta)?;
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(TopologyError::invalid_config(
                "random-waxman",
                "alpha",
                format!("must be a positive finite number (got {})", self.alpha),
            ));
        }
        Ok(())
    }
}

/// Random geometric graph parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometricConfig {
    /// Number of nodes.
    pub nodes: usize,
    /// Connection radius inside the unit hypercube.
    pub radius: f64,
    /// Dimensionality of the hypercube.
    pub dimension: usize,
    /// Seed for the positions.
    pub seed: Option<u64>,
}

impl Default for GeometricConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            radius: 0.15,
            dimension: 2,
            seed: None,
        }
    }
}

impl GeometricConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("random-geometric", "dimension", self.dimension, 1)?;
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(TopologyError::invalid_config(
                "random-geometric",
                "radius",
                format!("must be a non-negative finite number (got {})", self.radius),
            ));
        }
        Ok(())
    }
}

/// Random `k`-regular graph parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RandomRegularConfig {
    /// Number of nodes.
    pub nodes: usize,
    /// Degree of every node.
    pub degree: usize,
    /// Seed for the stub pairing.
    pub seed: Option<u64>,
}

impl Default for RandomRegularConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            degree: 4,
            seed: None,
        }
    }
}

impl RandomRegularConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.nodes > 0 && self.degree >= self.nodes {
            return Err(TopologyError::invalid_config(
                "random-regular",
                "degree",
                format!("must be below nodes ({} >= {})", self.degree, self.nodes),
            ));
        }
        let stubs = checked_total(
            "random-regular",
            "degree",
            self.nodes.checked_mul(self.degree),
        )?;
        if stubs % 2 != 0 {
            return Err(TopologyError::ParityViolation {
                family: "random-regular",
                reason: format!(
                    "nodes * degree must be even (got {} * {})",
                    self.nodes, self.degree
                ),
            });
        }
        Ok(())
    }
}

/// Caveman parameters: `cliques` cliques of `clique_size` nodes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CavemanConfig {
    /// Number of cliques (caves).
    pub cliques: usize,
    /// Size of each clique.
    pub clique_size: usize,
}

impl Default for CavemanConfig {
    fn default() -> Self {
        Self {
            cliques: 10,
            clique_size: 10,
        }
    }
}

impl CavemanConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("connected-caveman", "cliques", self.cliques, 1)?;
        require_at_least("connected-caveman", "clique_size", self.clique_size, 2)?;
        checked_total(
            "connected-caveman",
            "cliques",
            self.cliques.checked_mul(self.clique_size),
        )
        .map(|_| ())
    }
}

/// Relaxed caveman parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelaxedCavemanConfig {
    /// Number of cliques (caves).
    pub cliques: usize,
    /// Size of each clique.
    pub clique_size: usize,
    /// Probability of rewiring each clique edge to a random node.
    pub rewire_prob: f64,
    /// Seed for the rewiring draws.
    pub seed: Option<u64>,
}

impl Default for RelaxedCavemanConfig {
    fn default() -> Self {
        Self {
            cliques: 10,
            clique_size: 10,
            rewire_prob: 0.1,
            seed: None,
        }
    }
}

impl RelaxedCavemanConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        require_at_least("relaxed-caveman", "cliques", self.cliques, 1)?;
        require_at_least("relaxed-caveman", "clique_size", self.clique_size, 1)?;
        require_probability("relaxed-caveman", "rewire_prob", self.rewire_prob)?;
        checked_total(
            "relaxed-caveman",
            "cliques",
            self.cliques.checked_mul(self.clique_size),
        )
        .map(|_| ())
    }
}
