//! # footprint - Go Source Instrumentation
//!
//! footprint rewrites Go source files so that, when the program runs, every
//! function entry, goroutine launch and reached block end is reported to a
//! small runtime support library. The result is a call graph annotated with
//! which goroutine spawned which, recovered without touching the compiler.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Go module / directory / file                │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ candidate .go files
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Processor (worker threads)                      │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Front end   │──▶│  FrameTree   │──▶│   Rewrite    │         │
//! │  │ (tree-sitter)│   │   (arena)    │   │ (hook table) │         │
//! │  └──────────────┘   └──────┬───────┘   └──────┬───────┘         │
//! │                            │                  │                 │
//! │                            ▼                  ▼                 │
//! │                     ┌──────────────┐   ┌──────────────┐         │
//! │                     │   Analysis   │   │   Codegen    │         │
//! │                     │   (Stats)    │   │ (statements) │         │
//! │                     └──────┬───────┘   └──────────────┘         │
//! │                            ▼                                    │
//! │                     ┌──────────────┐                            │
//! │                     │    Export    │                            │
//! │                     │ (JSON/stdout)│                            │
//! │                     └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`frontend`]: Go parsing; walks the syntax tree and opens/closes frames
//! - [`frame`]: frame arena, build cursor and traversal
//! - [`rewrite`]: per-line hook table and the line-preserving rewriter
//! - [`codegen`]: identifier allocation, scope stack and statement templates
//! - [`engine`]: the single-file pipeline tying the above together
//! - [`processor`]: file discovery, artifacts, backups, parallel runs, clean
//! - [`analysis`]: structure statistics per file and in total
//! - [`export`]: JSON report and text summary
//! - [`cli`]: command-line arguments
//! - [`config`]: engine settings (support library path, alias, depth bound)
//! - [`domain`]: core newtypes and errors
//!
//! ## Output Shape
//!
//! Every original line stays on its own line, so compiler errors and stack
//! traces of the instrumented program still point at the right place.
//! Declarations of trace points go into a block appended after the last
//! line.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Look at the instrumented form of one file
//! footprint --file main.go --print
//!
//! # Instrument a whole module, skipping vendored code
//! footprint --package . -e vendor --stat
//!
//! # Put the sources back
//! footprint --package . --clean
//! ```

pub mod analysis;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod domain;
pub mod engine;
pub mod export;
pub mod frame;
pub mod frontend;
pub mod processor;
pub mod rewrite;
