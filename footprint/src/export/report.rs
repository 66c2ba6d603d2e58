//! JSON report exporter
//!
//! ```json
//! {
//!   "root": "./cmd/server",
//!   "files": [{ "file": "/abs/cmd/server/main.go", "stats": { "if_count": 3, ... } }],
//!   "total": { "if_count": 3, ... },
//!   "elapsed_ms": 12
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::Stats;
use crate::domain::ExportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
    pub total: Stats,
    pub elapsed_ms: u64,
}

/// Collects per-file statistics and writes them as one JSON document
#[derive(Debug)]
pub struct ReportExporter {
    root: PathBuf,
    files: Vec<FileReport>,
    elapsed: Duration,
}

impl ReportExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn add_file(&mut self, file: &Path, stats: Stats) {
        self.files.push(FileReport { file: file.to_path_buf(), stats });
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Build the report, totals are reduced in file order
    pub fn report(&self) -> Report {
        let mut total = Stats::default();
        for row in &self.files {
            total.add(&row.stats);
        }
        Report {
            root: self.root.clone(),
            files: self.files.clone(),
            total,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Write the report as pretty JSON
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use std::io::BufWriter;
    /// use footprint::export::ReportExporter;
    ///
    /// # fn example() -> Result<(), footprint::domain::ExportError> {
    /// let exporter = ReportExporter::new("./cmd");
    /// exporter.export(BufWriter::new(File::create("report.json")?))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, &self.report())?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
