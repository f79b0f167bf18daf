#![warn(missing_docs)]
//! Sevenbench CLI
//!
//! Command-line front end for the benchmark orchestrator: resolves the
//! configuration (flags, environment, `sevenbench.toml`), collects platform
//! metadata, drives one run per invocation, writes the run-record JSON plus
//! per-iteration raw logs, and offers an `aggregate` subcommand that merges
//! many result files into Markdown/CSV comparison tables.

mod config;
mod metadata;
mod output;

pub use config::{resolve_iterations, FileConfig, CONFIG_FILE_NAME};
pub use metadata::collect_platform_info;
pub use output::{file_stamp, result_path, RawFileSink};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sevenbench_core::{Orchestrator, RunConfiguration, DEFAULT_TOOL};
use sevenbench_report::{assemble_run_record, generate_json};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Sevenbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sevenbench")]
#[command(
    author,
    version,
    about = "Run 7z benchmark mode across configurations and emit JSON results"
)]
pub struct Cli {
    /// Optional subcommand; defaults to running one benchmark configuration
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 7z compression level (-mx), e.g. 1, 5, 9
    #[arg(long, default_value = "5")]
    pub mx: u32,

    /// 7z thread count (-mmt)
    #[arg(long, default_value = "1")]
    pub mmt: u32,

    /// 7z dictionary size as log2 (-md), e.g. 26
    #[arg(long, default_value = "26")]
    pub md: u32,

    /// Number of wrapper-driven iterations
    /// (falls back to ITERATIONS/DEFAULT_ITERATIONS env, then sevenbench.toml, then 1)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Output directory for JSON results and raw logs
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Seconds to wait between iterations
    #[arg(long)]
    pub cooldown: Option<f64>,

    /// Per-run timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Keep raw stdout/stderr inline in the JSON (can be large)
    #[arg(long)]
    pub keep_raw: bool,

    /// Benchmark tool to invoke instead of 7z
    #[arg(long)]
    pub tool: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one benchmark configuration (default)
    Run,
    /// Merge result files into Markdown/CSV comparison tables
    Aggregate {
        /// Directory to scan for JSON result files
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
        /// Output Markdown file (default: <results-dir>/aggregate.md)
        #[arg(long)]
        out_md: Option<PathBuf>,
        /// Output CSV file (default: <results-dir>/aggregate.csv)
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },
}

/// Run the sevenbench CLI. Main entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sevenbench=debug"
    } else {
        "sevenbench=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run_with_cli(cli)
}

/// Run the CLI with pre-parsed arguments (logging already initialized).
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Aggregate {
            ref results_dir,
            ref out_md,
            ref out_csv,
        }) => {
            let out_md = out_md
                .clone()
                .unwrap_or_else(|| results_dir.join("aggregate.md"));
            let out_csv = out_csv
                .clone()
                .unwrap_or_else(|| results_dir.join("aggregate.csv"));
            run_aggregate(results_dir.clone(), out_md, out_csv)
        }
        Some(Commands::Run) | None => run_benchmark(&cli),
    }
}

/// Execute one configuration run end to end.
pub fn run_benchmark(cli: &Cli) -> anyhow::Result<()> {
    let file_config = FileConfig::discover().unwrap_or_default();

    let tool = cli
        .tool
        .clone()
        .or_else(|| file_config.tool.clone())
        .unwrap_or_else(|| DEFAULT_TOOL.to_string());
    let outdir = cli
        .outdir
        .clone()
        .or_else(|| file_config.outdir.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("results"));

    let configuration = RunConfiguration {
        compression_level: cli.mx,
        thread_count: cli.mmt,
        dictionary_log2_size: cli.md,
        iterations: resolve_iterations(cli.iterations, &file_config),
        cooldown_seconds: cli.cooldown.or(file_config.cooldown).unwrap_or(0.5),
        timeout_seconds: cli.timeout,
    };

    let raw_dir = outdir.join("raw");
    fs::create_dir_all(&raw_dir)
        .with_context(|| format!("failed to create output directory {}", raw_dir.display()))?;

    let collected_at = Utc::now();
    let stamp = file_stamp(collected_at);
    let platform = collect_platform_info();
    let sink = RawFileSink::new(raw_dir, stamp.clone(), cli.mx, cli.mmt);

    let mut orchestrator =
        Orchestrator::new(configuration.clone(), &tool, sink, cli.keep_raw)?;
    install_interrupt_handler(orchestrator.cancel_flag());

    let command_line = orchestrator.command_line();
    tracing::info!(
        iterations = configuration.iterations,
        command = %command_line,
        "starting benchmark run"
    );

    let pb = ProgressBar::new(configuration.iterations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    let samples = orchestrator.run_with(|sample| {
        match sample.elapsed_seconds {
            Some(elapsed) => pb.set_message(format!("run {}: {:.3}s", sample.run_index, elapsed)),
            None => pb.set_message(format!(
                "run {}: {}",
                sample.run_index,
                sample.note.as_deref().unwrap_or("no result")
            )),
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let completed = samples.len();
    let record = assemble_run_record(collected_at, platform, configuration, command_line, samples);

    let record_path = result_path(&outdir, &stamp, cli.mx, cli.mmt);
    let json = generate_json(&record)?;
    fs::write(&record_path, json)
        .with_context(|| format!("failed to write results to {}", record_path.display()))?;

    if completed < record.configuration.iterations as usize {
        tracing::warn!(
            completed,
            requested = record.configuration.iterations,
            "run interrupted, wrote partial results"
        );
    }
    tracing::info!(path = %record_path.display(), "wrote results");
    Ok(())
}

/// Aggregate result files into Markdown and CSV tables.
pub fn run_aggregate(
    results_dir: PathBuf,
    out_md: PathBuf,
    out_csv: PathBuf,
) -> anyhow::Result<()> {
    let files = sevenbench_report::collect_result_files(&results_dir)
        .with_context(|| format!("failed to scan {}", results_dir.display()))?;
    if files.is_empty() {
        tracing::warn!(dir = %results_dir.display(), "no JSON result files found");
        return Ok(());
    }

    let mut rows: Vec<_> = files
        .iter()
        .filter_map(|path| sevenbench_report::row_from_file(path))
        .collect();
    sevenbench_report::sort_rows(&mut rows);

    if let Some(parent) = out_md.parent() {
        fs::create_dir_all(parent)?;
    }
    sevenbench_report::write_markdown(&rows, &out_md)?;
    sevenbench_report::write_csv(&rows, &out_csv)?;

    tracing::info!(
        files = rows.len(),
        md = %out_md.display(),
        csv = %out_csv.display(),
        "wrote aggregated tables"
    );
    Ok(())
}

static CANCEL_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn handle_interrupt(_sig: libc::c_int) {
    if let Some(flag) = CANCEL_FLAG.get() {
        flag.store(true, Ordering::Relaxed);
    }
}

/// Route SIGINT to the orchestrator's cancel flag so an interrupted run
/// still assembles and persists the samples collected so far.
fn install_interrupt_handler(flag: Arc<AtomicBool>) {
    let _ = CANCEL_FLAG.set(flag);
    unsafe {
        libc::signal(libc::SIGINT, handle_interrupt as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_original_wrapper() {
        let cli = Cli::parse_from(["sevenbench"]);
        assert_eq!(cli.mx, 5);
        assert_eq!(cli.mmt, 1);
        assert_eq!(cli.md, 26);
        assert!(cli.iterations.is_none());
        assert!(!cli.keep_raw);
    }

    #[test]
    fn test_aggregate_subcommand_parses() {
        let cli = Cli::parse_from(["sevenbench", "aggregate", "--results-dir", "out"]);
        match cli.command {
            Some(Commands::Aggregate { results_dir, .. }) => {
                assert_eq!(results_dir, PathBuf::from("out"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
