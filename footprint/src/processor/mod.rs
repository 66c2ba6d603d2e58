//! File, directory and package processing
//!
//! The processor resolves what to instrument, runs the single-file engine
//! on each candidate and writes artifacts. Files are independent: with more
//! than one job they are handed to worker threads through a channel and the
//! results are put back in discovery order before anything is reported.

pub mod artifact;
pub mod discovery;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{fs, io, thread};

use crossbeam_channel::bounded;
use log::{debug, info};

use crate::analysis::Stats;
use crate::config::EngineConfig;
use crate::domain::ProcessError;
use crate::engine::{analyze_source, instrument_source};

pub use artifact::CleanReport;
pub use discovery::GoModule;

/// Files processed since startup, across all workers
static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn processed_files() -> usize {
    FILE_COUNTER.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One source file
    File,
    /// The candidates directly inside a directory
    Dir,
    /// Every candidate below a directory governed by a `go.mod`
    Package,
}

/// What happens to the instrumented text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Write `<file>.gen.go`, moving the source to `<file>.gen_bak` when `rename`
    Files { rename: bool },
    /// Print to stdout, touch nothing
    Stdout,
    /// Parse and count only
    Dry,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub mode: Mode,
    pub target: PathBuf,
    /// Paths relative to the package root that are skipped in package mode
    pub excludes: Vec<PathBuf>,
    pub output: Output,
    pub jobs: usize,
    pub engine: EngineConfig,
}

/// Statistics of one processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub stats: Stats,
}

#[derive(Debug)]
pub struct Processor {
    options: ProcessOptions,
    module: Option<GoModule>,
}

impl Processor {
    /// Validate the target; package mode also requires a `go.mod`
    pub fn new(mut options: ProcessOptions) -> Result<Self, ProcessError> {
        let module = match options.mode {
            Mode::File => None,
            Mode::Dir => {
                if !options.target.is_dir() {
                    return Err(ProcessError::NotADirectory(options.target.clone()));
                }
                None
            }
            Mode::Package => {
                if !options.target.is_dir() {
                    return Err(ProcessError::NotADirectory(options.target.clone()));
                }
                Some(discovery::locate_module(&options.target)?)
            }
        };
        // stdout output must not interleave
        if options.output == Output::Stdout {
            options.jobs = 1;
        }
        options.jobs = options.jobs.max(1);
        Ok(Self { options, module })
    }

    pub fn module(&self) -> Option<&GoModule> {
        self.module.as_ref()
    }

    /// Files that a run would process, in processing order
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, ProcessError> {
        let target = &self.options.target;
        match self.options.mode {
            Mode::File => Ok(vec![target.clone()]),
            Mode::Dir => discovery::collect_dir(target),
            Mode::Package => discovery::collect_package(target, &self.options.excludes),
        }
    }

    /// Process every file; the first failure in file order aborts the run
    pub fn run(&self) -> Result<Vec<FileOutcome>, ProcessError> {
        let files = self.collect_files()?;
        info!("{} files to process", files.len());

        if self.options.jobs == 1 || files.len() < 2 {
            return files.iter().map(|file| process_file(file, &self.options)).collect();
        }
        self.run_parallel(files)
    }

    fn run_parallel(&self, files: Vec<PathBuf>) -> Result<Vec<FileOutcome>, ProcessError> {
        let jobs = self.options.jobs.min(files.len());
        debug!("processing {} files on {jobs} workers", files.len());

        let (task_tx, task_rx) = bounded::<(usize, PathBuf)>(jobs * 2);
        let (result_tx, result_rx) = bounded(files.len());
        let options = &self.options;
        let count = files.len();

        thread::scope(|scope| {
            let workers: Vec<_> = (0..jobs)
                .map(|_| {
                    let tasks = task_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move || {
                        for (index, file) in tasks {
                            let outcome = process_file(&file, options);
                            if results.send((index, outcome)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(task_rx);
            drop(result_tx);

            for task in files.into_iter().enumerate() {
                // every worker is gone, nothing left to feed
                if task_tx.send(task).is_err() {
                    break;
                }
            }
            drop(task_tx);

            for worker in workers {
                worker.join().map_err(|_| ProcessError::WorkerPanicked)?;
            }
            Ok::<(), ProcessError>(())
        })?;

        let mut slots: Vec<Option<Result<FileOutcome, ProcessError>>> = (0..count).map(|_| None).collect();
        for (index, outcome) in result_rx {
            slots[index] = Some(outcome);
        }
        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(ProcessError::WorkerPanicked)))
            .collect()
    }

    /// Remove artifacts and restore backups in the selected scope
    pub fn clean(&self) -> Result<CleanReport, ProcessError> {
        let target = &self.options.target;
        let report = match self.options.mode {
            Mode::File => artifact::clean_file(target)?,
            Mode::Dir => artifact::clean_dir(target, false, &[])?,
            Mode::Package => {
                let excluded: Vec<PathBuf> = self.options.excludes.iter().map(|e| target.join(e)).collect();
                artifact::clean_dir(target, true, &excluded)?
            }
        };
        info!("removed {} artifacts, restored {} sources", report.removed, report.restored);
        Ok(report)
    }
}

/// Instrument one file according to `options`
pub fn process_file(path: &Path, options: &ProcessOptions) -> Result<FileOutcome, ProcessError> {
    FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!("processing file: {}", file.display());

    let source = fs::read_to_string(&file)?;
    let instrument_error = |err| ProcessError::Instrument { file: file.clone(), source: err };

    if options.output == Output::Dry {
        let (_, stats) = analyze_source(&source).map_err(instrument_error)?;
        return Ok(FileOutcome { file, stats });
    }

    let instrumented =
        instrument_source(&file.to_string_lossy(), &source, &options.engine).map_err(instrument_error)?;

    match options.output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(instrumented.output.as_bytes())?;
            stdout.flush()?;
        }
        Output::Files { rename } => {
            artifact::write_artifact(&file, &instrumented.output)?;
            if rename {
                artifact::backup_source(&file)?;
            }
        }
        Output::Dry => {}
    }

    Ok(FileOutcome { file, stats: instrumented.stats })
}
