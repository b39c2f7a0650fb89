//! Command implementations and argument parsing for the tempograph CLI.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{info, instrument, warn};

use tempograph_core::{
    CliqueConfig, ClusteredGraphGenerator, GeneratorError, InstanceWriter, ReplayConfig,
    TemporalReplayGenerator,
};
use tempograph_datasets::{DatasetError, DatasetSpec, DatasetStore, dataset, datasets};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_OUT_DIR: &str = "instances";

/// Edit steps per synthetic instance in the batch suite.
const SUITE_EDIT_STEPS: u64 = 10_000_000;
const SUITE_VERTEX_COUNTS: [usize; 3] = [1_000, 10_000, 100_000];
const SUITE_SEEDS: [u64; 2] = [42, 666];

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tempograph",
    about = "Generate dynamic-connectivity benchmark instances."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Replay a registered temporal dataset under the TTL model.
    Replay(ReplayArgs),
    /// Synthesize a clustered random-graph instance pair.
    Cliques(CliquesArgs),
    /// Batch-generate the full benchmark suite into one directory.
    Suite(SuiteArgs),
}

/// Options accepted by the `replay` command.
#[derive(Debug, Args, Clone)]
pub struct ReplayArgs {
    /// Registered dataset name (see the dataset registry).
    pub dataset: String,

    /// Expected number of injected queries per insert/delete event.
    #[arg(long, default_value_t = 0.0)]
    pub query_frequency: f64,

    /// Emit warm-up and snapshot markers for block-query consumers.
    #[arg(long)]
    pub block_queries: bool,

    /// Seed for the run's random source.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output file (defaults to a name derived from the dataset).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Cache directory for raw dataset files.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Options accepted by the `cliques` command.
#[derive(Debug, Args, Clone)]
pub struct CliquesArgs {
    /// Number of vertices.
    pub vertices: usize,

    /// Vertices per clique.
    #[arg(long)]
    pub clique_size: usize,

    /// Measured edit steps after the warm-up phase.
    #[arg(long)]
    pub steps: u64,

    /// Seed for the run's random source.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Primary output file (defaults to a name derived from the shape).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Block-query output file (defaults to the primary name with `_bq`).
    #[arg(long)]
    pub block_out: Option<PathBuf>,
}

/// Options accepted by the `suite` command.
#[derive(Debug, Args, Clone)]
pub struct SuiteArgs {
    /// Directory the suite is written into.
    #[arg(long, default_value = "instances")]
    pub out_dir: PathBuf,

    /// Expected number of injected queries per insert/delete event in the
    /// replayed instances.
    #[arg(long, default_value_t = 0.0)]
    pub query_frequency: f64,

    /// Cache directory for raw dataset files.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Creating or writing an output file failed.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Dataset retrieval or parsing failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Instance generation failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// One instance file written by a command.
#[derive(Debug, Clone)]
pub struct InstanceReport {
    /// Short label derived from the output file name.
    pub label: String,
    /// Where the instance was written.
    pub path: PathBuf,
    /// `a`/`d`/`q`/`b` events in the file.
    pub events: u64,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Instance files written, in generation order.
    pub reports: Vec<InstanceReport>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when dataset retrieval, validation, or instance
/// generation fails.
#[instrument(name = "cli.run", err, skip(cli))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Cliques(args) => run_cliques(args),
        Command::Suite(args) => run_suite(args),
    }
}

#[instrument(
    name = "cli.replay",
    err,
    skip(args),
    fields(dataset = args.dataset, block_queries = args.block_queries, seed = args.seed)
)]
pub(super) fn run_replay(args: ReplayArgs) -> Result<ExecutionSummary, CliError> {
    let spec = dataset(&args.dataset).ok_or_else(|| DatasetError::UnknownDataset {
        name: args.dataset.clone(),
    })?;
    let store = store_for(args.cache_dir);
    let path = args.out.unwrap_or_else(|| {
        Path::new(DEFAULT_OUT_DIR).join(replay_file_name(
            spec.name,
            args.query_frequency,
            args.block_queries,
        ))
    });
    let report = write_replay_instance(
        &store,
        spec,
        args.query_frequency,
        args.block_queries,
        args.seed,
        &path,
    )?;
    Ok(ExecutionSummary {
        reports: vec![report],
    })
}

#[instrument(
    name = "cli.cliques",
    err,
    skip(args),
    fields(
        vertices = args.vertices,
        clique_size = args.clique_size,
        steps = args.steps,
        seed = args.seed,
    )
)]
pub(super) fn run_cliques(args: CliquesArgs) -> Result<ExecutionSummary, CliError> {
    let primary = args.out.unwrap_or_else(|| {
        Path::new(DEFAULT_OUT_DIR).join(cliques_file_name(
            args.vertices,
            args.clique_size,
            args.seed,
        ))
    });
    let block = args.block_out.unwrap_or_else(|| block_sibling(&primary));
    let config = CliqueConfig {
        vertex_count: args.vertices,
        clique_size: args.clique_size,
        num_steps: args.steps,
        seed: args.seed,
    };
    let (primary_report, block_report) = write_cliques_instance(config, &primary, &block)?;
    Ok(ExecutionSummary {
        reports: vec![primary_report, block_report],
    })
}

/// Batch-generates the benchmark suite: every downloadable registered
/// dataset (plain and block-query) plus the synthetic clustered instances.
///
/// Datasets that cannot be retrieved are skipped with a warning so one dead
/// mirror does not abort the whole batch; generation and I/O failures still
/// abort.
#[instrument(name = "cli.suite", err, skip(args), fields(out_dir = %args.out_dir.display()))]
pub(super) fn run_suite(args: SuiteArgs) -> Result<ExecutionSummary, CliError> {
    fs::create_dir_all(&args.out_dir).map_err(|source| CliError::Io {
        path: args.out_dir.clone(),
        source,
    })?;
    let store = store_for(args.cache_dir);
    let mut reports = Vec::new();

    for spec in datasets().iter().filter(|spec| spec.url.is_some()) {
        for block_queries in [false, true] {
            let path = args
                .out_dir
                .join(replay_file_name(spec.name, args.query_frequency, block_queries));
            match write_replay_instance(
                &store,
                spec,
                args.query_frequency,
                block_queries,
                DEFAULT_SEED,
                &path,
            ) {
                Ok(report) => reports.push(report),
                Err(CliError::Dataset(err)) => {
                    warn!(dataset = spec.name, error = %err, "skipping dataset");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
    }

    for vertex_count in SUITE_VERTEX_COUNTS {
        let mut clique_sizes = vec![100, vertex_count / 100];
        clique_sizes.dedup();
        for clique_size in clique_sizes {
            for seed in SUITE_SEEDS {
                let primary = args
                    .out_dir
                    .join(cliques_file_name(vertex_count, clique_size, seed));
                let block = block_sibling(&primary);
                let config = CliqueConfig {
                    vertex_count,
                    clique_size,
                    num_steps: SUITE_EDIT_STEPS,
                    seed,
                };
                let (primary_report, block_report) =
                    write_cliques_instance(config, &primary, &block)?;
                reports.push(primary_report);
                reports.push(block_report);
            }
        }
    }

    Ok(ExecutionSummary { reports })
}

#[instrument(
    name = "cli.write_replay",
    err,
    skip(store, spec),
    fields(dataset = spec.name, path = %path.display())
)]
fn write_replay_instance(
    store: &DatasetStore,
    spec: &DatasetSpec,
    query_frequency: f64,
    block_queries: bool,
    seed: u64,
    path: &Path,
) -> Result<InstanceReport, CliError> {
    let sequence = store.load(spec)?;
    let mut config = ReplayConfig::from_records(&sequence.records, spec.survival_time, seed)?
        .with_window(spec.start_override, spec.end_override)
        .with_query_frequency(query_frequency)
        .with_block_queries(block_queries);
    if let Some(points) = spec.fixed_test_points {
        config = config.with_test_points(points.to_vec());
    }
    let generator = TemporalReplayGenerator::new(sequence.records, sequence.vertex_count, config)?;

    let mut writer = create_instance_writer(path)?;
    write_file_header(&mut writer, path)?;
    let stats = generator.generate(&mut writer)?;
    info!(
        dataset = spec.name,
        inserts = stats.inserts,
        deletes = stats.deletes,
        queries = stats.queries,
        "replay instance written"
    );
    Ok(report_for(path, writer.events_written()))
}

fn write_cliques_instance(
    config: CliqueConfig,
    primary_path: &Path,
    block_path: &Path,
) -> Result<(InstanceReport, InstanceReport), CliError> {
    let generator = ClusteredGraphGenerator::new(config)?;
    let mut primary = create_instance_writer(primary_path)?;
    let mut block = create_instance_writer(block_path)?;
    write_file_header(&mut primary, primary_path)?;
    write_file_header(&mut block, block_path)?;
    let stats = generator.generate(&mut primary, &mut block)?;
    info!(
        vertices = config.vertex_count,
        clique_size = config.clique_size,
        inserts = stats.initial_inserts + stats.inserts,
        deletes = stats.deletes,
        "clustered instance pair written"
    );
    Ok((
        report_for(primary_path, primary.events_written()),
        report_for(block_path, block.events_written()),
    ))
}

fn create_instance_writer(path: &Path) -> Result<InstanceWriter<File>, CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| CliError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(InstanceWriter::new(file))
}

fn write_file_header<W: Write>(
    writer: &mut InstanceWriter<W>,
    path: &Path,
) -> Result<(), CliError> {
    writer
        .comment(&format!("file: {}", path.display()))
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn store_for(cache_dir: Option<PathBuf>) -> DatasetStore {
    cache_dir.map(DatasetStore::new).unwrap_or_default()
}

fn report_for(path: &Path, events: u64) -> InstanceReport {
    let label = path
        .file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "instance".to_owned());
    InstanceReport {
        label,
        path: path.to_path_buf(),
        events,
    }
}

pub(super) fn replay_file_name(name: &str, query_frequency: f64, block_queries: bool) -> String {
    if block_queries {
        format!("{name}_bq.inst")
    } else {
        format!("{name}_{query_frequency}.inst")
    }
}

pub(super) fn cliques_file_name(vertices: usize, clique_size: usize, seed: u64) -> String {
    format!("cliques_{vertices}_{clique_size}_{seed}.inst")
}

/// Derives the block-query sibling of a primary output path.
pub(super) fn block_sibling(primary: &Path) -> PathBuf {
    let stem = primary
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("instance");
    primary.with_file_name(format!("{stem}_bq.inst"))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "instances written: {}", summary.reports.len())?;
    for report in &summary.reports {
        writeln!(
            writer,
            "{}\t{} events\t{}",
            report.label,
            report.events,
            report.path.display()
        )?;
    }
    Ok(())
}
