//! Analysis of finished frame trees
//!
//! Pure counting over the tree, separated from code generation so that dry
//! runs can report without rewriting anything.

pub mod stats;

pub use stats::Stats;
