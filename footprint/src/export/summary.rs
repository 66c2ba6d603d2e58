//! Text summary printed by `--stat`

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::analysis::Stats;

const RULE: &str = "********************************************************";

pub fn write_summary<W: Write>(
    mut out: W,
    root: &Path,
    stats: &Stats,
    files: usize,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "code structure statistics for: {}", root.display())?;
    writeln!(out, " >> function amount: \t{}", stats.func_count)?;
    writeln!(out, " >> go func amount: \t{}", stats.go_func_count)?;
    writeln!(out, " >> if amount: \t\t{}", stats.if_count)?;
    writeln!(out, " >> for amount: \t{}", stats.for_count)?;
    writeln!(out, " >> case amount: \t{}", stats.case_count)?;
    writeln!(
        out,
        "source file has {} lines, will produce {} tracing point({:.2}%)",
        stats.lines,
        stats.injection_points,
        stats.injection_ratio()
    )?;
    writeln!(out, "process {files} files in {elapsed:?}")?;
    writeln!(out, "{RULE}")
}
