//! # footprint - Main Entry Point
//!
//! Supports three targets, selected by exactly one of:
//! - **File** (`--file main.go`): instrument a single source
//! - **Directory** (`--dir ./pkg`): instrument the sources directly inside it
//! - **Package** (`--package .`): instrument a module tree, honoring `--exclude`
//!
//! `--clean` undoes a previous run on the same target.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Instant;

use footprint::analysis::Stats;
use footprint::cli::Args;
use footprint::domain::ProcessError;
use footprint::export::{write_summary, ReportExporter};
use footprint::processor::{processed_files, Processor};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    // usage errors exit with clap's code 2
    let args = Args::parse();
    init_logger(args.log_level());
    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

/// `RUST_LOG` wins over the level picked by `-v`/`-s`
fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ProcessError>() {
        Some(ProcessError::NotADirectory(_)) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run(args: &Args) -> Result<()> {
    let options = args.process_options();
    let root = options.target.clone();
    let processor = Processor::new(options)
        .with_context(|| format!("Invalid target {}", root.display()))?;

    if args.clean {
        let report = processor.clean().context("Clean failed")?;
        info!("clean finished: {} removed, {} restored", report.removed, report.restored);
        return Ok(());
    }

    let start = Instant::now();
    let outcomes = processor.run()?;
    let elapsed = start.elapsed();

    let mut total = Stats::default();
    for outcome in &outcomes {
        total.add(&outcome.stats);
    }

    if args.stat {
        write_summary(io::stdout().lock(), &root, &total, processed_files(), elapsed)
            .context("Failed to print statistics")?;
    }

    if let Some(ref path) = args.export {
        let mut exporter = ReportExporter::new(&root);
        for outcome in &outcomes {
            exporter.add_file(&outcome.file, outcome.stats);
        }
        exporter.set_elapsed(elapsed);
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        exporter
            .export(BufWriter::new(file))
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("exported statistics of {} files to {}", exporter.file_count(), path.display());
    }

    info!("done all success");
    Ok(())
}
