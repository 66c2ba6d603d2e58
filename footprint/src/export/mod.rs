//! Reporting of instrumentation statistics
//!
//! - `report`: JSON document with per-file and total statistics (`--export`)
//! - `summary`: human-readable summary (`--stat`)

pub mod report;
pub mod summary;

pub use report::ReportExporter;
pub use summary::write_summary;
