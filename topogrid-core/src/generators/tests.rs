//! Registry and configuration resolution tests.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::error::TopologyErrorCode;

#[fixture]
fn no_params() -> GeneratorParams {
    GeneratorParams::new()
}

fn params(value: Value) -> GeneratorParams {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[rstest]
fn every_family_round_trips_through_its_name() {
    for family in Family::ALL {
        assert_eq!(family.name().parse::<Family>(), Ok(family));
    }
}

#[rstest]
fn misspelled_lattice_alias_is_accepted() {
    assert_eq!(
        "torroidal-lattice".parse::<Family>(),
        Ok(Family::ToroidalLattice)
    );
}

#[rstest]
fn unknown_family_is_rejected(no_params: GeneratorParams) {
    let err = generate("small-world", &no_params).expect_err("unknown family");
    assert_eq!(err.code(), TopologyErrorCode::UnknownFamily);
}

#[rstest]
fn missing_keys_take_defaults(no_params: GeneratorParams) {
    let config = Family::RelaxedCaveman
        .resolve(&no_params)
        .expect("defaults resolve");
    assert_eq!(
        config,
        FamilyConfig::RelaxedCaveman(RelaxedCavemanConfig::default())
    );
}

#[rstest]
fn unknown_keys_are_ignored() {
    let config = Family::Star
        .resolve(&params(json!({ "nodes": 7, "colour": "blue" })))
        .expect("extra keys ignored");
    assert_eq!(config, FamilyConfig::Star(NodeCountConfig { nodes: 7 }));
}

#[rstest]
fn mistyped_parameter_is_invalid_config() {
    let err = Family::WellMixed
        .resolve(&params(json!({ "nodes": "many" })))
        .expect_err("string node count");
    assert!(matches!(
        err,
        TopologyError::InvalidConfig {
            family: "well-mixed",
            parameter: "params",
            ..
        }
    ));
}

#[rstest]
#[case(Family::CometKite)]
#[case(Family::CliqueRing)]
#[case(Family::RandomErdosRenyi)]
#[case(Family::RandomRegular)]
fn stochastic_family_without_seed_is_rejected(#[case] family: Family) {
    let err = family
        .resolve(&GeneratorParams::new())
        .and_then(|config| config.build())
        .expect_err("seed is mandatory");
    assert!(matches!(
        err,
        TopologyError::InvalidConfig {
            parameter: "seed",
            ..
        }
    ));
}

#[rstest]
fn with_seed_only_touches_stochastic_families() {
    let star = FamilyConfig::Star(NodeCountConfig::default()).with_seed(3);
    assert_eq!(star.seed(), None);
    let ring = FamilyConfig::CliqueRing(CliqueRingConfig::default()).with_seed(3);
    assert_eq!(ring.seed(), Some(3));
}

#[rstest]
fn odd_stub_count_is_a_parity_violation() {
    let err = generate(
        "random-regular",
        &params(json!({ "nodes": 5, "degree": 3, "seed": 1 })),
    )
    .expect_err("odd stub count");
    assert_eq!(err.code(), TopologyErrorCode::ParityViolation);
}

#[rstest]
#[case(json!({ "nodes": 10, "edges": 10, "seed": 1 }))]
#[case(json!({ "nodes": 10, "edges": 0, "seed": 1 }))]
fn barabasi_albert_bounds_are_enforced(#[case] raw: Value) {
    let err = generate("random-barabasi-albert", &params(raw)).expect_err("out of range");
    assert_eq!(err.code(), TopologyErrorCode::InvalidConfig);
}

#[rstest]
#[case(json!({ "graph_width": 0, "graph_height": 4 }))]
#[case(json!({ "graph_width": 4, "graph_height": 0 }))]
fn zero_lattice_dimension_is_rejected(#[case] raw: Value) {
    let err = generate("toroidal-lattice", &params(raw)).expect_err("zero dimension");
    assert_eq!(err.code(), TopologyErrorCode::InvalidConfig);
}

#[rstest]
fn probability_outside_unit_interval_is_rejected() {
    let err = generate(
        "random-erdos-renyi",
        &params(json!({ "edge_prob": 1.5, "seed": 1 })),
    )
    .expect_err("probability above one");
    assert!(matches!(
        err,
        TopologyError::InvalidConfig {
            parameter: "edge_prob",
            ..
        }
    ));
}

#[rstest]
#[case(0, 3 * 3 + 3)]
#[case(1, 3 * (3 * 3 + 3) + 3)]
fn hierarchical_ring_merges_layers(#[case] layers: u32, #[case] edges: usize) {
    // Three triangles per base ring, linked directly.
    let graph = generate(
        "hierarchical-clique-ring",
        &params(json!({
            "clique_size": 3,
            "community_count": 3,
            "layers": layers,
            "nodes_between_communities": 0,
            "seed": 8,
        })),
    )
    .expect("hierarchical ring builds");
    assert_eq!(graph.node_count(), 9 * 3_usize.pow(layers));
    assert_eq!(graph.edge_count(), edges);
}

#[rstest]
fn build_with_matches_seeded_build() {
    let config = FamilyConfig::RandomErdosRenyi(ErdosRenyiConfig {
        nodes: 30,
        edge_prob: 0.3,
        seed: None,
    });
    let a = config
        .build_with(&mut rng_from_seed(5))
        .expect("seedless build");
    let b = config
        .clone()
        .with_seed(5)
        .build()
        .expect("seeded build");
    assert_eq!(a, b);
}

#[rstest]
#[case("toroidal-lattice", json!({ "graph_width": 1_u64 << 33, "graph_height": 1_u64 << 33 }), "graph_height")]
#[case("windmill", json!({ "cliques": usize::MAX, "clique_size": 3 }), "cliques")]
#[case("connected-caveman", json!({ "cliques": usize::MAX, "clique_size": 2 }), "cliques")]
#[case(
    "relaxed-caveman",
    json!({ "cliques": usize::MAX, "clique_size": 2, "seed": 1 }),
    "cliques"
)]
#[case(
    "comet-kite",
    json!({ "core_size": usize::MAX, "num_tails": 1, "seed": 1 }),
    "additional_tail_nodes"
)]
#[case(
    "clique-ring",
    json!({ "clique_size": usize::MAX, "clique_count": 2, "seed": 1 }),
    "clique_count"
)]
#[case(
    "hierarchical-clique-ring",
    json!({ "clique_size": 1, "community_count": 1 << 20, "layers": 3, "seed": 1 }),
    "layers"
)]
#[case("random-regular", json!({ "nodes": usize::MAX, "degree": 2, "seed": 1 }), "degree")]
fn oversized_node_counts_are_rejected(
    #[case] family: &str,
    #[case] raw: Value,
    #[case] expected: &str,
) {
    let err = generate(family, &params(raw)).expect_err("node count overflows");
    assert!(
        matches!(&err, TopologyError::InvalidConfig { parameter, .. } if *parameter == expected),
        "unexpected error: {err:?}"
    );
}

#[rstest]
#[case(2, 0, 1)]
#[case(3, 2, 2)]
#[case(4, 1, 0)]
#[case(1, 3, 2)]
fn hierarchical_node_total_matches_built_graph(
    #[case] community_count: usize,
    #[case] layers: u32,
    #[case] nodes_between_communities: usize,
) -> Result<()> {
    let config = HierarchicalCliqueRingConfig {
        clique_size: 3,
        community_count,
        layers,
        nodes_between_communities,
        seed: Some(6),
    };
    let graph = FamilyConfig::HierarchicalCliqueRing(config.clone()).build()?;
    assert_eq!(graph.node_count(), config.node_total()?);
    Ok(())
}
