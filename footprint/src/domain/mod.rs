//! Frame identifiers, source positions and error enums shared by every stage

pub mod errors;
pub mod types;

pub use errors::{ExportError, InstrumentError, ProcessError};
pub use types::{Anchor, FrameId};
