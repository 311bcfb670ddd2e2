//! linear-classify - multi-organ score fusion
//!
//! **Usage:**
//! ```bash
//! linear-classify [-t 0|1|2] [-r w1:w2:w3] [-m max_ratio] data_set_file [predict_out_file]
//! ```
//!
//! - `-t 0` WEIGHT: weighted mean of organ scores (`-r`, default 1:1:1)
//! - `-t 1` MAX: per-class maximum across organs, normalized
//! - `-t 2` AUTO: try WEIGHT ratios up to `-m` (default 5) and MAX, keep the best

use anyhow::{Context, Result};
use clap::Parser;
use plantfuse::ingest::read_table;
use plantfuse::mode::{default_output_path, RunMode};
use plantfuse::output::write_predictions_file;
use plantfuse::pipeline::execute;
use plantfuse::report::{CliFormatter, RunReport};
use plantfuse_common::config::{load_resolved, log_source};
use plantfuse_common::logging::init_tracing;
use plantfuse_common::TomlConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Command-line arguments for linear-classify
#[derive(Parser, Debug)]
#[command(name = "linear-classify")]
#[command(about = "Fuse entire/leaf/flower classification scores and measure top-1 accuracy")]
#[command(version)]
struct Args {
    /// Sparse score file: `<label> <index>:<value> ...` per line
    input: PathBuf,

    /// Prediction output file (default: <input basename>.out)
    output: Option<PathBuf>,

    /// Algorithm type: 0 = WEIGHT, 1 = MAX, 2 = AUTO
    #[arg(short = 't', long = "type", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    algorithm_type: u8,

    /// Organ ratio for WEIGHT type, entire:leaf:flower (default 1:1:1)
    #[arg(short = 'r', long = "ratio", value_name = "W1:W2:W3")]
    ratio: Option<String>,

    /// Upper bound of each weight in AUTO type (default 5)
    #[arg(short = 'm', long = "max-ratio", allow_negative_numbers = true)]
    max_ratio: Option<i64>,

    /// Evaluate AUTO candidates in parallel
    #[arg(long)]
    parallel: bool,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Export run report to JSON file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help / --version print to stdout and succeed
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let (config, source) = match load_resolved(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error! {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Error! {}", e);
        std::process::exit(1);
    }

    log_source(&source);

    let start_time = Instant::now();
    match run(&args, &config) {
        Ok(()) => {
            info!("Done in {:.2} seconds", start_time.elapsed().as_secs_f64());
        }
        Err(e) => {
            eprintln!("Error! {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Validate arguments, load data, classify, write results
fn run(args: &Args, config: &TomlConfig) -> Result<()> {
    let mode = RunMode::from_selectors(
        args.algorithm_type,
        args.ratio.as_deref(),
        args.max_ratio,
        config.search.max_ratio,
    )?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    let mut table = read_table(&args.input, config.input.delimiter)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let parallel = args.parallel || config.search.parallel;
    let execution = execute(&mut table, mode, parallel).context("Classification failed")?;

    if let Some(outcome) = &execution.search {
        for candidate in &outcome.candidates {
            println!("{}", CliFormatter::format_candidate(candidate, table.len()));
        }
        println!("{}", CliFormatter::format_candidate_count(outcome));
    }

    write_predictions_file(&table, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{}",
        CliFormatter::format_summary(&execution.strategy, &execution.accuracy)
    );

    if let Some(export_path) = &args.export {
        let report = RunReport::new(
            args.input.clone(),
            output,
            table.feature_count(),
            execution.strategy,
            execution.accuracy,
            execution.search.as_ref(),
        );
        report
            .export_json(export_path)
            .with_context(|| format!("Failed to export {}", export_path.display()))?;
        println!("Results exported to: {}", export_path.display());
    }

    Ok(())
}
