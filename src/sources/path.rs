//! Path source - library sources from the local filesystem.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::cmake::is_cmake_project;
use crate::sources::Source;
use crate::util::fs::{copy_file, find_by_name, glob_files, relative_path, reset_dir};

/// License file names, in lookup order.
pub const LICENSE_NAMES: &[&str] = &["LICENSE", "LICENSE.txt", "LICENSE.md"];

/// A source tree already present on disk.
pub struct PathSource {
    /// The root path
    path: PathBuf,

    /// Globs (relative to the root) exported into a build
    exports: Vec<String>,
}

impl PathSource {
    /// Create a new path source.
    pub fn new(path: PathBuf, exports: Vec<String>) -> Self {
        PathSource { path, exports }
    }

    /// Expand the export globs, plus the license file.
    fn exported_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for pattern in &self.exports {
            // `dir/*` exports the whole directory, nested files included
            if let Some(dir) = pattern.strip_suffix("/*") {
                files.extend(find_by_name(&self.path.join(dir), "*", true)?);
            } else {
                files.extend(glob_files(&self.path, std::slice::from_ref(pattern))?);
            }
        }

        if let Some(license) = LICENSE_NAMES
            .iter()
            .map(|name| self.path.join(name))
            .find(|p| p.is_file())
        {
            files.push(license);
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl Source for PathSource {
    fn name(&self) -> &str {
        "path"
    }

    fn root(&self) -> &Path {
        &self.path
    }

    fn export(&self, dest: &Path) -> Result<PathBuf> {
        if !self.path.is_dir() {
            bail!("source directory not found: {}", self.path.display());
        }
        if !is_cmake_project(&self.path) {
            bail!(
                "no CMakeLists.txt in {}\n\
                 help: point --source at the library's source tree",
                self.path.display()
            );
        }

        reset_dir(dest)?;

        let files = self.exported_files()?;
        for file in &files {
            copy_file(file, &dest.join(relative_path(&self.path, file)))?;
        }

        tracing::info!(
            "Exported {} source file(s) from {}",
            files.len(),
            self.path.display()
        );
        Ok(dest.to_path_buf())
    }
}
