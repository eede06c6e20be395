use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::SimError;

/// File names treated as traces when scanning a directory
pub const CSV_PATTERN: &str = r"^.+\.csv$";

/// Lists the regular files in `dir` whose names match `pattern`, sorted by file name
///
/// Entries which can't be inspected, or whose names aren't valid unicode, are skipped
pub fn matching_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>, SimError> {
    let entries = fs::read_dir(dir).map_err(|e| SimError::io(dir, e))?;
    let mut files = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_str().map(|name| pattern.is_match(name)).unwrap_or(false))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Lists the `.csv` files in `dir`, sorted by file name
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, SimError> {
    let pattern = Regex::new(CSV_PATTERN).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
    matching_files(dir, &pattern)
}

/// Expands directories into the `.csv` files they contain, keeping other paths as they are
pub fn expand_trace_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, SimError> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            out.extend(csv_files(path)?);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}
