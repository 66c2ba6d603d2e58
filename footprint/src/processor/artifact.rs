//! Output files next to their sources
//!
//! `main.go` is instrumented into `main.go.gen.go`; the original is moved
//! to `main.go.gen_bak` so the Go toolchain only sees the instrumented copy.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

pub const ARTIFACT_SUFFIX: &str = ".gen.go";
pub const BACKUP_SUFFIX: &str = ".gen_bak";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn artifact_path(source: &Path) -> PathBuf {
    with_suffix(source, ARTIFACT_SUFFIX)
}

pub fn backup_path(source: &Path) -> PathBuf {
    with_suffix(source, BACKUP_SUFFIX)
}

/// Write the instrumented text with the permissions of the source file
pub fn write_artifact(source: &Path, content: &str) -> io::Result<PathBuf> {
    let permissions = fs::metadata(source)?.permissions();
    let output = artifact_path(source);
    info!("output file is {}", output.display());
    fs::write(&output, content)?;
    fs::set_permissions(&output, permissions)?;
    Ok(output)
}

/// Move the source out of the way of the Go toolchain
pub fn backup_source(source: &Path) -> io::Result<PathBuf> {
    let backup = backup_path(source);
    info!("replace file: {}", source.display());
    fs::rename(source, &backup)?;
    Ok(backup)
}

/// What a clean pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: usize,
    pub restored: usize,
}

impl CleanReport {
    fn merge(&mut self, other: CleanReport) {
        self.removed += other.removed;
        self.restored += other.restored;
    }
}

/// Undo instrumentation of one source file
pub fn clean_file(source: &Path) -> io::Result<CleanReport> {
    let mut report = CleanReport::default();

    let artifact = artifact_path(source);
    if artifact.is_file() {
        fs::remove_file(&artifact)?;
        info!("removed {}", artifact.display());
        report.removed += 1;
    }

    let backup = backup_path(source);
    if backup.is_file() {
        if source.exists() {
            warn!("{} exists, keep backup {}", source.display(), backup.display());
        } else {
            fs::rename(&backup, source)?;
            info!("restored {}", source.display());
            report.restored += 1;
        }
    }
    Ok(report)
}

/// Undo instrumentation of every file in `dir`, descending when `recursive`
pub fn clean_dir(dir: &Path, recursive: bool, excluded: &[PathBuf]) -> io::Result<CleanReport> {
    let mut report = CleanReport::default();
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if excluded.contains(&path) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_dir() {
            if recursive && !name.starts_with('.') {
                report.merge(clean_dir(&path, recursive, excluded)?);
            }
            continue;
        }
        // an artifact and its backup name the same source, the second visit finds nothing left
        let original = name
            .strip_suffix(BACKUP_SUFFIX)
            .or_else(|| name.strip_suffix(ARTIFACT_SUFFIX));
        if let Some(original) = original {
            report.merge(clean_file(&path.with_file_name(original))?);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let source = Path::new("/src/app/main.go");
        assert_eq!(artifact_path(source), PathBuf::from("/src/app/main.go.gen.go"));
        assert_eq!(backup_path(source), PathBuf::from("/src/app/main.go.gen_bak"));
    }

    #[test]
    fn test_write_backup_and_clean() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.go");
        fs::write(&source, "package main\n").unwrap();

        let artifact = write_artifact(&source, "package main\n// instrumented\n").unwrap();
        let backup = backup_source(&source).unwrap();
        assert!(artifact.is_file());
        assert!(backup.is_file());
        assert!(!source.exists());

        let report = clean_dir(dir.path(), false, &[]).unwrap();
        assert_eq!(report, CleanReport { removed: 1, restored: 1 });
        assert_eq!(fs::read_to_string(&source).unwrap(), "package main\n");
        assert!(!artifact.exists());
    }

    #[test]
    fn test_clean_artifact_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("util.go");
        fs::write(&source, "package main\n").unwrap();
        write_artifact(&source, "x").unwrap();

        let report = clean_dir(dir.path(), false, &[]).unwrap();
        assert_eq!(report, CleanReport { removed: 1, restored: 0 });
        assert!(source.is_file());
    }
}
