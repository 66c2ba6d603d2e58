//! Code generation for instrumented frames
//!
//! - `naming`: collision-free identifier prefixes and Go string quoting
//! - `env`: per-file naming state and the goroutine-lineage scope stack
//! - `emit`: `on_enter` / `on_exit` / `on_finalize` per frame kind

pub mod emit;
pub mod env;
pub mod naming;

pub use emit::{on_enter, on_exit, on_finalize};
pub use env::{FramePoints, GenerationEnvironment};
