//! Finding source files by folder instead of by name.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Excel leaves `~$name.xlsx` lock files next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("~$"))
        .unwrap_or(false)
}

/// Regular files in `dir` with one of `extensions`, sorted by name.
pub fn all_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("Failed to list {}: {}", dir.display(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to list {}: {}", dir.display(), e))?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) && !is_lock_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Most recently modified file in `dir` with one of `extensions`. Ties go to
/// the greater file name.
pub fn latest_file(dir: &Path, extensions: &[&str]) -> Result<PathBuf, String> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for path in all_files(dir, extensions)? {
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| format!("Failed to stat {}: {}", path.display(), e))?;
        // `all_files` is name-sorted, so >= lets the later name win a tie
        if best.as_ref().map_or(true, |(t, _)| modified >= *t) {
            best = Some((modified, path));
        }
    }
    best.map(|(_, path)| path).ok_or_else(|| {
        format!(
            "No {} file found in {}",
            extensions.join("/"),
            dir.display()
        )
    })
}
