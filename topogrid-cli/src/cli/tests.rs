//! Tests for CLI command orchestration.

use super::*;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;
use topogrid_core::{FormatErrorCode, GraphFormat, TopologyErrorCode, read_matrix};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{}", panic_msg),
        Err(err) => err,
    }
}

fn generate_cli(config: PathBuf, dump_dir: &Path, overwrite: bool) -> Cli {
    Cli {
        command: Command::Generate(GenerateArgs {
            config,
            dump_dir: dump_dir.to_path_buf(),
            overwrite,
        }),
    }
}

fn graph_input(path: PathBuf, graph_format: GraphFormat) -> GraphInputArgs {
    GraphInputArgs {
        graph_file: path,
        graph_format,
        directed: false,
    }
}

fn grid_args(world_x: usize, world_y: usize) -> GridArgs {
    GridArgs {
        world_x,
        world_y,
        trigger: "u begin".to_owned(),
    }
}

fn artifacts(report: CommandReport) -> Vec<ArtifactRecord> {
    match report {
        CommandReport::Artifacts(records) => records,
        other => panic!("expected artifacts, got {other:?}"),
    }
}

fn csv(report: CommandReport) -> String {
    match report {
        CommandReport::Csv(text) => text,
        other => panic!("expected CSV, got {other:?}"),
    }
}

const REPLICATED_RING: &str = r#"{
    "graphs-to-generate": [
        {
            "graph": "clique-ring",
            "params": { "clique_size": 4, "clique_count": 3, "nodes_between_cliques": 1 },
            "count": 3,
            "base_seed": 10,
            "output_id": "ring"
        },
        { "graph": "cycle", "params": { "nodes": 6 }, "output_mode": "edges" }
    ]
}"#;

#[rstest]
fn generate_names_replicates_by_seed() -> TestResult {
    let dir = temp_dir();
    let config = write_file(dir.path(), "graphs.json", REPLICATED_RING)?;
    let out = dir.path().join("out");
    let records = artifacts(run_cli(generate_cli(config, &out, false))?);
    let names: Vec<_> = records
        .iter()
        .filter_map(|record| record.path.file_name()?.to_str().map(ToOwned::to_owned))
        .collect();
    assert_eq!(names, ["ring_10.mat", "ring_11.mat", "ring_12.mat", "cycle.csv"]);
    assert!(records.iter().all(|r| r.outcome == WriteOutcome::Written));

    let ring = read_matrix(&fs::read_to_string(out.join("ring_11.mat"))?)?;
    assert_eq!(ring.node_count(), 15);
    let cycle = fs::read_to_string(out.join("cycle.csv"))?;
    assert!(cycle.starts_with("from,to\n0,1\n"));
    Ok(())
}

#[rstest]
fn generate_is_reproducible_across_runs() -> TestResult {
    let dir = temp_dir();
    let config = write_file(dir.path(), "graphs.json", REPLICATED_RING)?;
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    run_cli(generate_cli(config.clone(), &first, false))?;
    run_cli(generate_cli(config, &second, false))?;
    for name in ["ring_10.mat", "ring_11.mat", "ring_12.mat"] {
        assert_eq!(
            fs::read_to_string(first.join(name))?,
            fs::read_to_string(second.join(name))?
        );
    }
    assert_ne!(
        fs::read_to_string(first.join("ring_10.mat"))?,
        fs::read_to_string(first.join("ring_11.mat"))?
    );
    Ok(())
}

#[rstest]
#[case(false, "keep me", WriteOutcome::SkippedExisting)]
#[case(true, "0,1,1\n1,0,1\n1,1,0\n", WriteOutcome::Written)]
fn generate_respects_overwrite(
    #[case] overwrite: bool,
    #[case] expected: &str,
    #[case] outcome: WriteOutcome,
) -> TestResult {
    let dir = temp_dir();
    let config = write_file(
        dir.path(),
        "graphs.json",
        r#"{"graphs-to-generate": [{"graph": "well-mixed", "params": {"nodes": 3}}]}"#,
    )?;
    write_file(dir.path(), "well-mixed.mat", "keep me")?;
    let records = artifacts(run_cli(generate_cli(config, dir.path(), overwrite))?);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, outcome);
    assert_eq!(fs::read_to_string(dir.path().join("well-mixed.mat"))?, expected);
    Ok(())
}

#[rstest]
fn generate_validates_whole_batch_before_writing() -> TestResult {
    let dir = temp_dir();
    let config = write_file(
        dir.path(),
        "graphs.json",
        r#"{"graphs-to-generate": [
            {"graph": "star", "params": {"nodes": 5}},
            {"graph": "scale-free"}
        ]}"#,
    )?;
    let out = dir.path().join("out");
    let err = run_cli_expecting_error(generate_cli(config, &out, false), "unknown family");
    assert!(matches!(err, CliError::Request { index: 1, .. }));
    assert_eq!(err.topology_code(), Some(TopologyErrorCode::UnknownFamily));
    assert!(!out.exists());
    Ok(())
}

#[rstest]
#[case::missing_seed(r#"{"graph": "random-erdos-renyi"}"#, TopologyErrorCode::InvalidConfig)]
#[case::zero_count(r#"{"graph": "star", "count": 0}"#, TopologyErrorCode::InvalidConfig)]
#[case::odd_stubs(
    r#"{"graph": "random-regular", "params": {"nodes": 5, "degree": 3, "seed": 1}}"#,
    TopologyErrorCode::ParityViolation
)]
#[case::unseeded_growth(
    r#"{"graph": "star", "increase_size_to": 200}"#,
    TopologyErrorCode::InvalidConfig
)]
fn invalid_requests_carry_topology_codes(
    #[case] request: &str,
    #[case] code: TopologyErrorCode,
) -> TestResult {
    let config = BatchConfig::from_json(&format!(r#"{{"graphs-to-generate": [{request}]}}"#))?;
    let err = plan(&config).expect_err("request must be rejected");
    assert_eq!(err.topology_code(), Some(code));
    Ok(())
}

#[rstest]
fn duplicate_outputs_are_rejected() -> TestResult {
    let config = BatchConfig::from_json(
        r#"{"graphs-to-generate": [
            {"graph": "star", "output_id": "shared"},
            {"graph": "cycle", "output_id": "shared"}
        ]}"#,
    )?;
    let err = plan(&config).expect_err("names collide");
    assert!(matches!(err, CliError::InvalidBatch { .. }));
    Ok(())
}

#[rstest]
fn growth_seeds_follow_replicates() -> TestResult {
    let config = BatchConfig::from_json(
        r#"{"graphs-to-generate": [
            {"graph": "star", "params": {"nodes": 5}, "count": 2,
             "increase_size_to": 9, "growth_seed": 100},
            {"graph": "random-erdos-renyi", "params": {"seed": 3}, "increase_size_to": 120}
        ]}"#,
    )?;
    let jobs = plan(&config)?;
    let growth: Vec<_> = jobs.iter().map(|job| job.growth).collect();
    assert_eq!(growth[0], Some(Growth { target_size: 9, seed: 100 }));
    assert_eq!(growth[1], Some(Growth { target_size: 9, seed: 101 }));
    assert_eq!(
        growth[2],
        Some(Growth {
            target_size: 120,
            seed: topogrid_core::derive_stream_seed(3, 1),
        })
    );
    Ok(())
}

#[rstest]
fn grown_replicates_reach_target() -> TestResult {
    let dir = temp_dir();
    let config = write_file(
        dir.path(),
        "graphs.json",
        r#"{"graphs-to-generate": [
            {"graph": "linear-chain", "params": {"nodes": 5},
             "increase_size_to": 10, "growth_seed": 7}
        ]}"#,
    )?;
    run_cli(generate_cli(config, dir.path(), false))?;
    let grown = read_matrix(&fs::read_to_string(dir.path().join("linear-chain.mat"))?)?;
    assert_eq!(grown.node_count(), 10);
    assert!(grown.nodes().all(|node| grown.degree(node) >= 1));
    Ok(())
}

#[rstest]
fn malformed_config_reports_path() -> TestResult {
    let dir = temp_dir();
    let config = write_file(dir.path(), "graphs.json", r#"{"graphs": []}"#)?;
    let err = run_cli_expecting_error(generate_cli(config.clone(), dir.path(), false), "bad json");
    assert!(matches!(&err, CliError::Config { path, .. } if path == &config));
    Ok(())
}

#[rstest]
fn events_writes_sequence_and_location_map() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "pair.csv", "from,to\n0,3\n3,0\n1,NONE\n2,NONE\n")?;
    let location_map = dir.path().join("locations.csv");
    let cli = Cli {
        command: Command::Events(EventsArgs {
            input: graph_input(graph, GraphFormat::Edges),
            grid: grid_args(2, 2),
            dump_dir: dir.path().to_path_buf(),
            out_name: "events.cfg".to_owned(),
            location_map: Some(location_map.clone()),
            overwrite: false,
        }),
    };
    let records = artifacts(run_cli(cli)?);
    assert_eq!(records.len(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("events.cfg"))?,
        "# -- Disconnect all locations --\n\
         u begin DisconnectCellsAll\n\
         # -- Reconnect locations to impose spatial structure -- \n\
         u begin ConnectCells 0 0 1 1\n"
    );
    assert_eq!(
        fs::read_to_string(location_map)?,
        "node,x,y\n0,0,0\n1,0,1\n2,1,0\n3,1,1\n"
    );
    Ok(())
}

#[rstest]
fn events_uses_custom_trigger() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "edge.mat", "0,1\n1,0\n")?;
    let mut grid = grid_args(1, 2);
    grid.trigger = "u 500".to_owned();
    let cli = Cli {
        command: Command::Events(EventsArgs {
            input: graph_input(graph, GraphFormat::Matrix),
            grid,
            dump_dir: dir.path().to_path_buf(),
            out_name: "events.cfg".to_owned(),
            location_map: None,
            overwrite: false,
        }),
    };
    run_cli(cli)?;
    let text = fs::read_to_string(dir.path().join("events.cfg"))?;
    assert!(text.contains("u 500 DisconnectCellsAll\n"));
    assert!(text.contains("u 500 ConnectCells 0 0 0 1\n"));
    Ok(())
}

#[rstest]
fn events_rejects_graph_larger_than_grid() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "triangle.mat", "0,1,1\n1,0,1\n1,1,0\n")?;
    let cli = Cli {
        command: Command::Events(EventsArgs {
            input: graph_input(graph, GraphFormat::Matrix),
            grid: grid_args(1, 2),
            dump_dir: dir.path().to_path_buf(),
            out_name: "events.cfg".to_owned(),
            location_map: None,
            overwrite: false,
        }),
    };
    let err = run_cli_expecting_error(cli, "grid too small");
    assert_eq!(err.topology_code(), Some(TopologyErrorCode::GraphTooLarge));
    assert!(!dir.path().join("events.cfg").exists());
    Ok(())
}

#[rstest]
fn non_square_matrix_reports_format_code() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "bad.mat", "0,1,0\n1,0,1\n")?;
    let cli = Cli {
        command: Command::Summarize(graph_input(graph.clone(), GraphFormat::Matrix)),
    };
    let err = run_cli_expecting_error(cli, "matrix is not square");
    assert!(matches!(&err, CliError::Graph { path, .. } if path == &graph));
    assert_eq!(err.topology_code(), Some(TopologyErrorCode::FormatFailure));
    assert_eq!(err.format_code(), Some(FormatErrorCode::MalformedMatrix));
    Ok(())
}

fn events_batch_cli(structures: &Path, events: &Path, replicates: u64) -> Cli {
    Cli {
        command: Command::EventsBatch(EventsBatchArgs {
            structures_dir: structures.to_path_buf(),
            prefix: "ring".to_owned(),
            replicates,
            grid: grid_args(2, 2),
            events_dir: events.to_path_buf(),
            overwrite: false,
        }),
    }
}

#[rstest]
fn events_batch_writes_one_file_per_replicate() -> TestResult {
    let dir = temp_dir();
    let structures = dir.path().join("structures");
    fs::create_dir(&structures)?;
    for index in [10, 2, 0, 1] {
        write_file(&structures, &format!("ring_{index}.mat"), "0,1\n1,0\n")?;
    }
    write_file(&structures, "ring-large_0.mat", "0\n")?;
    let events = dir.path().join("events");
    let records = artifacts(run_cli(events_batch_cli(&structures, &events, 3))?);
    let mut names: Vec<_> = records
        .iter()
        .filter_map(|record| record.path.file_name()?.to_str().map(ToOwned::to_owned))
        .collect();
    names.sort();
    assert_eq!(names, ["events_ring_0.cfg", "events_ring_1.cfg", "events_ring_2.cfg"]);
    let text = fs::read_to_string(events.join("events_ring_2.cfg"))?;
    assert!(text.ends_with("u begin ConnectCells 0 0 0 1\n"));
    Ok(())
}

#[rstest]
fn events_batch_shares_a_single_structure() -> TestResult {
    let dir = temp_dir();
    write_file(dir.path(), "ring.mat", "0,1\n1,0\n")?;
    let records = artifacts(run_cli(events_batch_cli(dir.path(), dir.path(), 30))?);
    assert_eq!(records.len(), 1);
    assert!(dir.path().join("events_ring.cfg").exists());
    Ok(())
}

#[rstest]
fn events_batch_needs_enough_structures() -> TestResult {
    let dir = temp_dir();
    for index in 0..2 {
        write_file(dir.path(), &format!("ring_{index}.mat"), "0,1\n1,0\n")?;
    }
    let err = run_cli_expecting_error(events_batch_cli(dir.path(), dir.path(), 3), "too few");
    assert!(matches!(
        err,
        CliError::InsufficientStructures {
            found: 2,
            requested: 3,
            ..
        }
    ));
    Ok(())
}

fn births_cli(graph: PathBuf, isolated: IsolatedArg, output: Option<PathBuf>) -> Cli {
    Cli {
        command: Command::Births(BirthsArgs {
            input: graph_input(graph, GraphFormat::Edges),
            no_self_replacement: true,
            isolated,
            output,
            overwrite: false,
        }),
    }
}

#[rstest]
fn births_prints_csv_to_stdout() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "star.csv", "from,to\n0,1\n0,2\n")?;
    let text = csv(run_cli(births_cli(graph, IsolatedArg::Reject, None))?);
    assert_eq!(
        text,
        "node,expected_births,prop_births\n0,2,0.6666666666666666\n1,0.5,0.16666666666666666\n\
         2,0.5,0.16666666666666666\n"
    );
    Ok(())
}

#[rstest]
fn births_isolated_policy_is_selectable() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "gap.csv", "from,to\n0,1\n2,NONE\n")?;
    let err = run_cli_expecting_error(
        births_cli(graph.clone(), IsolatedArg::Reject, None),
        "isolated node",
    );
    assert_eq!(
        err.topology_code(),
        Some(TopologyErrorCode::DivisionByZeroDegree)
    );

    let output = dir.path().join("births.csv");
    let records = artifacts(run_cli(births_cli(
        graph,
        IsolatedArg::ZeroWeight,
        Some(output.clone()),
    ))?);
    assert_eq!(records[0].outcome, WriteOutcome::Written);
    assert!(fs::read_to_string(output)?.contains("2,0,0\n"));
    Ok(())
}

#[rstest]
fn summarize_reports_structure() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(dir.path(), "chain.csv", "from,to\n0,1\n1,2\n")?;
    let cli = Cli {
        command: Command::Summarize(graph_input(graph, GraphFormat::Edges)),
    };
    let text = csv(run_cli(cli)?);
    assert!(text.starts_with("metric,value\nnodes,3\nedges,2\n"));
    assert!(text.ends_with("components,1\ndiameter,2\n"));
    Ok(())
}

#[rstest]
fn list_renders_every_family() -> TestResult {
    let report = run_cli(Cli {
        command: Command::List,
    })?;
    let mut buffer = Vec::new();
    render_report(&report, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.starts_with("Available graph generators:\n  - well-mixed\n"));
    assert_eq!(text.lines().count(), 18);
    Ok(())
}

#[rstest]
fn artifact_report_lists_outcomes() -> TestResult {
    let report = CommandReport::Artifacts(vec![
        ArtifactRecord {
            path: PathBuf::from("a.mat"),
            outcome: WriteOutcome::Written,
        },
        ArtifactRecord {
            path: PathBuf::from("b.mat"),
            outcome: WriteOutcome::SkippedExisting,
        },
    ]);
    let mut buffer = Vec::new();
    render_report(&report, &mut buffer)?;
    assert_eq!(String::from_utf8(buffer)?, "written\ta.mat\nskipped\tb.mat\n");
    Ok(())
}

#[rstest]
#[case::zero_replicates(&[
    "topogrid", "events-batch", "--structures-dir", ".", "--prefix", "r", "--replicates", "0",
])]
#[case::unknown_policy(&["topogrid", "births", "--graph-file", "g.mat", "--isolated", "ignore"])]
#[case::unknown_format(&[
    "topogrid", "summarize", "--graph-file", "g.mat", "--graph-format", "json",
])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn clap_parses_events_defaults() {
    let args = [
        "topogrid",
        "events",
        "--graph-file",
        "g.csv",
        "--graph-format",
        "edges",
        "-x",
        "4",
    ];
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    };
    let Command::Events(args) = cli.command else {
        panic!("expected the events command");
    };
    assert_eq!(args.input.graph_format, GraphFormat::Edges);
    assert_eq!((args.grid.world_x, args.grid.world_y), (4, 10));
    assert_eq!(args.grid.trigger, "u begin");
    assert_eq!(args.out_name, "event_cmds.dat");
}
