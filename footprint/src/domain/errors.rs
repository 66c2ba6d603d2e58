//! Errors of the engine, the processor and the report exporter
//!
//! `InstrumentError` fails a single file; `ProcessError` wraps it with the
//! file name and adds what can go wrong around it on disk.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("Failed to parse Go source at line {line}")]
    ParseFailed { line: usize },

    #[error("Failed to load the Go grammar: {0}")]
    LanguageInit(String),

    #[error("Found `\\r\\n` or `\\r` line terminators, this would break code generation")]
    MixedLineTerminators,

    #[error("Too many nested scopes (limit {capacity})")]
    ScopeOverflow { capacity: usize },

    #[error("Scope stack corrupted: needed {needed} active scopes, found {depth}")]
    ScopeUnderflow { needed: usize, depth: usize },

    #[error("Unsupported receiver type at line {line}")]
    MalformedReceiver { line: usize },

    #[error("Frame tree still has {open} open frames")]
    UnbalancedFrames { open: usize },

    #[error("No open frame to close")]
    NoOpenFrame,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Cannot find go.mod in `{0}` or any parent directory")]
    ModuleNotFound(PathBuf),

    #[error("Path `{0}` is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to instrument {file}: {source}")]
    Instrument {
        file: PathBuf,
        #[source]
        source: InstrumentError,
    },

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
