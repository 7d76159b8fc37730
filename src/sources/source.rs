//! Source trait definition.

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Supplies the library's source tree to a build.
pub trait Source {
    /// Source kind for log output.
    fn name(&self) -> &str;

    /// Where the original sources live.
    fn root(&self) -> &Path;

    /// Place a build-owned copy of the sources at `dest` and return the
    /// directory the build should configure.
    fn export(&self, dest: &Path) -> Result<PathBuf>;
}
