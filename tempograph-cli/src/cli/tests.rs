use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use super::commands::{block_sibling, cliques_file_name, replay_file_name};
use super::{Cli, CliError, CliquesArgs, Command, ReplayArgs, run_cli};
use tempograph_datasets::DatasetError;

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("instance file is readable")
        .lines()
        .map(ToOwned::to_owned)
        .collect()
}

fn mutations(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("a ") || line.starts_with("d "))
        .cloned()
        .collect()
}

#[test]
fn parses_replay_arguments() {
    let cli = Cli::try_parse_from([
        "tempograph",
        "replay",
        "dnc",
        "--query-frequency",
        "0.5",
        "--block-queries",
        "--seed",
        "7",
    ])
    .expect("valid arguments must parse");
    let Command::Replay(args) = cli.command else {
        panic!("expected the replay command");
    };
    assert_eq!(args.dataset, "dnc");
    assert!((args.query_frequency - 0.5).abs() < f64::EPSILON);
    assert!(args.block_queries);
    assert_eq!(args.seed, 7);
    assert!(args.out.is_none());
}

#[test]
fn parses_cliques_arguments() {
    let cli = Cli::try_parse_from([
        "tempograph",
        "cliques",
        "1000",
        "--clique-size",
        "100",
        "--steps",
        "5000",
    ])
    .expect("valid arguments must parse");
    let Command::Cliques(args) = cli.command else {
        panic!("expected the cliques command");
    };
    assert_eq!(args.vertices, 1000);
    assert_eq!(args.clique_size, 100);
    assert_eq!(args.steps, 5000);
    assert_eq!(args.seed, 42);
}

#[rstest]
#[case("dnc", 0.0, false, "dnc_0.inst")]
#[case("dnc", 0.5, false, "dnc_0.5.inst")]
#[case("enron", 2.0, true, "enron_bq.inst")]
fn replay_file_names_encode_frequency_or_block_mode(
    #[case] name: &str,
    #[case] frequency: f64,
    #[case] block: bool,
    #[case] expected: &str,
) {
    assert_eq!(replay_file_name(name, frequency, block), expected);
}

#[test]
fn block_sibling_appends_the_bq_suffix() {
    let primary = PathBuf::from("out/cliques_1000_100_42.inst");
    assert_eq!(
        block_sibling(&primary),
        PathBuf::from("out/cliques_1000_100_42_bq.inst")
    );
    assert_eq!(cliques_file_name(1000, 100, 42), "cliques_1000_100_42.inst");
}

#[test]
fn replay_rejects_unknown_datasets() {
    let err = run_cli(Cli {
        command: Command::Replay(ReplayArgs {
            dataset: "no-such-dataset".to_owned(),
            query_frequency: 0.0,
            block_queries: false,
            seed: 42,
            out: None,
            cache_dir: None,
        }),
    })
    .expect_err("unknown dataset must fail");
    assert!(
        matches!(
            &err,
            CliError::Dataset(DatasetError::UnknownDataset { name }) if name == "no-such-dataset"
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn replays_the_cached_fixture_end_to_end() {
    let cache = TempDir::new().expect("temp cache dir");
    let out_dir = TempDir::new().expect("temp output dir");
    fs::write(
        cache.path().join("test.edges"),
        "1,2,0\n1,3,0\n1,4,0\n2,3,0\n3,4,0\n2,5,0\n3,5,0\n4,5,0\n",
    )
    .expect("fixture file writes");

    let out = out_dir.path().join("test_bq.inst");
    let summary = run_cli(Cli {
        command: Command::Replay(ReplayArgs {
            dataset: "test".to_owned(),
            query_frequency: 0.0,
            block_queries: true,
            seed: 42,
            out: Some(out.clone()),
            cache_dir: Some(cache.path().to_path_buf()),
        }),
    })
    .expect("fixture replay succeeds");

    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].events, 17);

    let lines = read_lines(&out);
    assert_eq!(lines.len(), 20);
    assert!(lines[0].starts_with("c file:"));
    assert_eq!(lines[1], "c blockQueries");
    assert_eq!(lines[2], "t");
    // All eight edges arrive at clock 0, in raw file order.
    let expected_inserts = [
        "a 1 2", "a 1 3", "a 1 4", "a 2 3", "a 3 4", "a 2 5", "a 3 5", "a 4 5",
    ];
    assert_eq!(&lines[3..11], expected_inserts);
    // The fixture's first test point fires right after the arrivals.
    assert_eq!(lines[11], "b");
    // The whole batch expires together at clock 3, in canonical edge order.
    let expected_deletes = [
        "d 1 2", "d 1 3", "d 1 4", "d 2 3", "d 2 5", "d 3 4", "d 3 5", "d 4 5",
    ];
    assert_eq!(&lines[12..20], expected_deletes);
}

#[test]
fn cliques_writes_lock_stepped_streams() {
    let out_dir = TempDir::new().expect("temp output dir");
    let primary_path = out_dir.path().join("cliques.inst");
    let block_path = out_dir.path().join("cliques_bq.inst");

    let summary = run_cli(Cli {
        command: Command::Cliques(CliquesArgs {
            vertices: 20,
            clique_size: 4,
            steps: 50,
            seed: 7,
            out: Some(primary_path.clone()),
            block_out: Some(block_path.clone()),
        }),
    })
    .expect("clustered generation succeeds");
    assert_eq!(summary.reports.len(), 2);

    let primary = read_lines(&primary_path);
    let block = read_lines(&block_path);

    assert!(primary[0].starts_with("c file:"));
    assert_eq!(primary[1], "c clique-size: 4");
    assert_eq!(block[1], "c clique-size: 4");

    // Identical mutation sequence on both streams.
    assert_eq!(mutations(&primary), mutations(&block));
    assert!(primary.contains(&"t 0 0".to_owned()));
    assert!(block.contains(&"t 0 0".to_owned()));

    // Snapshot markers only reach the block stream: one per measured step
    // because the interval clamps to 1 for short runs.
    assert!(primary.iter().all(|line| line != "b"));
    assert_eq!(block.iter().filter(|line| *line == "b").count(), 50);
}

#[test]
fn cliques_determinism_is_seeded() {
    let out_dir = TempDir::new().expect("temp output dir");
    let mut outputs = Vec::new();
    for run in 0..2 {
        let primary = out_dir.path().join(format!("run{run}.inst"));
        let block = out_dir.path().join(format!("run{run}_bq.inst"));
        run_cli(Cli {
            command: Command::Cliques(CliquesArgs {
                vertices: 20,
                clique_size: 4,
                steps: 200,
                seed: 99,
                out: Some(primary.clone()),
                block_out: Some(block),
            }),
        })
        .expect("clustered generation succeeds");
        // Drop the header line; it embeds the per-run output path.
        outputs.push(read_lines(&primary)[1..].to_vec());
    }
    assert_eq!(outputs[0], outputs[1]);
}
