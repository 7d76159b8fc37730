//! On-disk package layout.

use std::path::{Path, PathBuf};

use crate::core::artifact::Destination;

/// The canonical destination tree of a package:
/// `include/`, `lib/`, `bin/` and `licenses/` under a single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a destination category.
    pub fn dir(&self, dest: Destination) -> PathBuf {
        self.root.join(dest.dir_name())
    }

    pub fn include_dir(&self) -> PathBuf {
        self.dir(Destination::Include)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.dir(Destination::Lib)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.dir(Destination::Bin)
    }

    pub fn licenses_dir(&self) -> PathBuf {
        self.dir(Destination::Licenses)
    }

    /// Path of the published consumption descriptor.
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join("package-info.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_dirs() {
        let layout = PackageLayout::new("/pkg");
        assert_eq!(layout.include_dir(), PathBuf::from("/pkg/include"));
        assert_eq!(layout.lib_dir(), PathBuf::from("/pkg/lib"));
        assert_eq!(layout.bin_dir(), PathBuf::from("/pkg/bin"));
        assert_eq!(layout.licenses_dir(), PathBuf::from("/pkg/licenses"));
    }
}
