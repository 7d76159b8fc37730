//! Package collection: copy build output into the canonical layout.

use std::path::{Path, PathBuf};

use crate::core::artifact::{patterns_for, ArtifactCategory, ArtifactPattern, SearchRoot};
use crate::core::error::PackageError;
use crate::core::layout::PackageLayout;
use crate::core::target::BuildTarget;
use crate::util::fs::{copy_file, ensure_dir, find_by_name, relative_path, reset_dir};

/// A file placed into the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedArtifact {
    pub category: ArtifactCategory,
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Everything one collection run copied.
#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub artifacts: Vec<CollectedArtifact>,
}

impl CollectReport {
    pub fn count(&self, category: ArtifactCategory) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.category == category)
            .count()
    }

    pub fn has_library(&self) -> bool {
        self.artifacts.iter().any(|a| a.category.is_library())
    }
}

/// Populate `layout` from a finished build.
///
/// The package root is cleared first, so collecting twice from the same
/// build output yields the same tree. Patterns matching nothing are skipped;
/// the run fails with [`PackageError::PackagingIncomplete`] only if no
/// library for the target's linkage was found at all.
pub fn collect_package(
    target: &BuildTarget,
    source_dir: &Path,
    build_dir: &Path,
    layout: &PackageLayout,
) -> Result<CollectReport, PackageError> {
    tracing::info!("Packaging {} into {}", target, layout.root().display());

    reset_dir(layout.root())?;
    ensure_dir(&layout.include_dir())?;
    ensure_dir(&layout.lib_dir())?;

    let mut report = CollectReport::default();
    let include_root = source_dir.join("include");

    for pattern in patterns_for(target.linkage) {
        let (base, recursive) = match pattern.root {
            SearchRoot::SourceInclude => (include_root.as_path(), true),
            SearchRoot::SourceRoot => (source_dir, false),
            SearchRoot::BuildTree => (build_dir, true),
        };

        let matches = find_by_name(base, pattern.glob, recursive)?;
        if matches.is_empty() {
            tracing::debug!("Pattern `{}` matched nothing in {}", pattern.glob, base.display());
            continue;
        }

        for file in matches {
            let dest = destination_for(&pattern, base, &file, layout);
            copy_file(&file, &dest)?;
            tracing::debug!("  {} -> {}", file.display(), dest.display());
            report.artifacts.push(CollectedArtifact {
                category: pattern.category,
                source: file,
                dest,
            });
        }
    }

    if report.count(ArtifactCategory::License) == 0 {
        tracing::warn!("No license file found in {}", source_dir.display());
    }

    if !report.has_library() {
        return Err(PackageError::PackagingIncomplete {
            linkage: target.linkage,
            dir: build_dir.to_path_buf(),
        });
    }

    tracing::info!(
        "Packaged {} header(s), {} library file(s)",
        report.count(ArtifactCategory::Header),
        report.artifacts.iter().filter(|a| a.category.is_library()).count()
    );

    Ok(report)
}

fn destination_for(
    pattern: &ArtifactPattern,
    base: &Path,
    file: &Path,
    layout: &PackageLayout,
) -> PathBuf {
    let dir = layout.dir(pattern.destination);
    if pattern.keeps_path() {
        dir.join(relative_path(base, file))
    } else {
        // Flattened: only the file name survives
        match file.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::{BuildType, CompilerFamily, Linkage, Os};
    use crate::test_support::{list_files, BuildFixture, SourceFixture};
    use tempfile::TempDir;

    fn target(os: Os, linkage: Linkage) -> BuildTarget {
        BuildTarget::new(os, CompilerFamily::default_for(os), BuildType::Release, linkage)
    }

    #[test]
    fn test_linux_static_package() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::linux_static(&tmp.path().join("build"));
        let layout = PackageLayout::new(tmp.path().join("package"));

        let report = collect_package(
            &target(Os::Linux, Linkage::Static),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap();

        assert_eq!(
            list_files(layout.root()),
            vec![
                "include/detail/numeric_utils.h",
                "include/window_funcs.hpp",
                "include/wittig_sinha.h",
                "lib/libsmelt.a",
                "licenses/LICENSE",
            ]
        );
        assert_eq!(report.count(ArtifactCategory::StaticLib), 1);
    }

    #[test]
    fn test_windows_release_shared_places_dll_and_import_lib() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::windows_shared(&tmp.path().join("build"));
        let layout = PackageLayout::new(tmp.path().join("package"));

        collect_package(
            &target(Os::Windows, Linkage::Shared),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap();

        assert!(layout.bin_dir().join("smelt.dll").is_file());
        assert!(layout.lib_dir().join("smelt.lib").is_file());
        assert!(!layout.lib_dir().join("smelt.dll").exists());
        assert!(!layout.lib_dir().join("smelt.exp").exists());
    }

    #[test]
    fn test_missing_dylib_is_fine_when_so_matched() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::linux_shared(&tmp.path().join("build"));
        let layout = PackageLayout::new(tmp.path().join("package"));

        let report = collect_package(
            &target(Os::Linux, Linkage::Shared),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap();

        assert_eq!(report.count(ArtifactCategory::SharedObject), 1);
        assert!(layout.lib_dir().join("libsmelt.so").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_versioned_shared_library_symlink_collected() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::new(&tmp.path().join("build")).with_file("lib/libsmelt.so.1");
        std::os::unix::fs::symlink("libsmelt.so.1", build.root.join("lib/libsmelt.so")).unwrap();
        let layout = PackageLayout::new(tmp.path().join("package"));

        let report = collect_package(
            &target(Os::Linux, Linkage::Shared),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap();

        assert_eq!(report.count(ArtifactCategory::SharedObject), 1);
        let copied = layout.lib_dir().join("libsmelt.so");
        assert!(copied.is_file());
        assert!(!std::fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_no_library_is_packaging_incomplete() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        // Static archive only; a shared package needs a shared object
        let build = BuildFixture::linux_static(&tmp.path().join("build"));
        let layout = PackageLayout::new(tmp.path().join("package"));

        let err = collect_package(
            &target(Os::Linux, Linkage::Shared),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PackageError::PackagingIncomplete {
                linkage: Linkage::Shared,
                ..
            }
        ));
    }

    #[test]
    fn test_collect_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::linux_shared(&tmp.path().join("build"));
        let layout = PackageLayout::new(tmp.path().join("package"));
        let target = target(Os::Linux, Linkage::Shared);

        collect_package(&target, &source.root, &build.root, &layout).unwrap();
        let first = list_files(layout.root());

        // A stale file from some earlier run must not survive
        std::fs::write(layout.lib_dir().join("libstale.so"), "").unwrap();

        collect_package(&target, &source.root, &build.root, &layout).unwrap();
        assert_eq!(list_files(layout.root()), first);
    }

    #[test]
    fn test_libraries_flattened_headers_keep_path() {
        let tmp = TempDir::new().unwrap();
        let source = SourceFixture::create(&tmp.path().join("source"));
        let build = BuildFixture::new(&tmp.path().join("build"))
            .with_file("deeply/nested/dir/libsmelt.a");
        let layout = PackageLayout::new(tmp.path().join("package"));

        collect_package(
            &target(Os::Linux, Linkage::Static),
            &source.root,
            &build.root,
            &layout,
        )
        .unwrap();

        assert!(layout.lib_dir().join("libsmelt.a").is_file());
        assert!(layout
            .include_dir()
            .join("detail")
            .join("numeric_utils.h")
            .is_file());
    }
}
