//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove and recreate a directory so it starts out empty.
pub fn reset_dir(path: &Path) -> Result<()> {
    remove_dir_all_if_exists(path)?;
    ensure_dir(path)
}

/// Copy a file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Find files whose *file name* matches `pattern`.
///
/// With `recursive`, the whole tree under `base` is searched; otherwise only
/// its immediate children. Results are sorted. A missing `base` yields no
/// matches.
pub fn find_by_name(base: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?;

    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let options = match_options();
    let mut results = Vec::new();

    for entry in WalkDir::new(base).max_depth(max_depth).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("walk error: {}", e);
                continue;
            }
        };

        // Symlinks count when they resolve to a file (libfoo.so -> libfoo.so.1)
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if pattern.matches_with(&name, options) {
            results.push(entry.into_path());
        }
    }

    results.sort();
    Ok(results)
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob::glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
