//! Language front ends
//!
//! A front end turns source text into a finished [`crate::frame::FrameTree`]
//! by driving a [`crate::frame::BuildCursor`]. Only Go is supported.

pub mod go;

pub use go::{line_count, parse};
