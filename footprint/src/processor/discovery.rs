//! Candidate file discovery and `go.mod` location

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::domain::ProcessError;

/// Module declared by a `go.mod` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Directory holding the `go.mod`
    pub root: PathBuf,
    /// Module path from the `module` directive
    pub path: String,
}

/// Go sources that get instrumented: no tests, no artifacts, no dot-files
pub fn is_candidate(file_name: &str) -> bool {
    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.ends_with(super::artifact::ARTIFACT_SUFFIX)
        && !file_name.starts_with('.')
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or("")
}

/// Entries of a directory, sorted by name
fn sorted_entries(dir: &Path) -> Result<Vec<(PathBuf, bool)>, ProcessError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        entries.push((entry.path(), is_dir));
    }
    entries.sort();
    Ok(entries)
}

/// Candidate files directly inside `dir`
pub fn collect_dir(dir: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    if !dir.is_dir() {
        return Err(ProcessError::NotADirectory(dir.to_path_buf()));
    }
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|(path, is_dir)| !is_dir && is_candidate(file_name(path)))
        .map(|(path, _)| path)
        .collect())
}

/// Candidate files below `root`, skipping hidden directories and every path
/// equal to an exclude entry joined to `root`
pub fn collect_package(root: &Path, excludes: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    if !root.is_dir() {
        return Err(ProcessError::NotADirectory(root.to_path_buf()));
    }
    let excluded: Vec<PathBuf> = excludes.iter().map(|e| root.join(e)).collect();
    let mut files = Vec::new();
    walk_package(root, &excluded, &mut files)?;
    Ok(files)
}

fn walk_package(dir: &Path, excluded: &[PathBuf], files: &mut Vec<PathBuf>) -> Result<(), ProcessError> {
    for (path, is_dir) in sorted_entries(dir)? {
        if excluded.contains(&path) {
            info!("filter: {}", path.display());
            continue;
        }
        let name = file_name(&path);
        if is_dir {
            if name.starts_with('.') {
                debug!("skip hidden directory {}", path.display());
                continue;
            }
            walk_package(&path, excluded, files)?;
        } else if is_candidate(name) {
            files.push(path);
        }
    }
    Ok(())
}

/// Find the `go.mod` governing `dir`, searching upwards
pub fn locate_module(dir: &Path) -> Result<GoModule, ProcessError> {
    let start = std::path::absolute(dir)?;
    for candidate in start.ancestors() {
        let go_mod = candidate.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }
        let content = fs::read_to_string(&go_mod)?;
        let path = module_path(&content).unwrap_or_default();
        info!("found module {path}");
        info!("module path: {}", candidate.display());
        return Ok(GoModule { root: candidate.to_path_buf(), path });
    }
    Err(ProcessError::ModuleNotFound(dir.to_path_buf()))
}

/// Value of the `module` directive of a `go.mod` file
pub fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_string())
    })
}
