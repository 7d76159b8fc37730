//! Test fixtures for common test scenarios.
//!
//! Builds small on-disk source and build trees shaped like the library's
//! real ones.

use std::fs;
use std::path::{Path, PathBuf};

/// A source tree with headers (one nested), a license and CMake files.
#[derive(Debug, Clone)]
pub struct SourceFixture {
    pub root: PathBuf,
}

impl SourceFixture {
    /// Write the fixture under `root`.
    pub fn create(root: &Path) -> Self {
        write(root, "CMakeLists.txt", "cmake_minimum_required(VERSION 3.10)\n");
        write(root, "LICENSE", "BSD 2-Clause License\n");
        write(root, "include/wittig_sinha.h", "#pragma once\n");
        write(root, "include/window_funcs.hpp", "#pragma once\n");
        write(root, "include/detail/numeric_utils.h", "#pragma once\n");
        write(root, "src/wittig_sinha.cc", "// source\n");
        write(root, "test/factory_tests.cc", "// test\n");
        write(root, "notes.txt", "not exported\n");

        SourceFixture {
            root: root.to_path_buf(),
        }
    }
}

/// A build tree holding library outputs in nested directories.
#[derive(Debug, Clone)]
pub struct BuildFixture {
    pub root: PathBuf,
}

impl BuildFixture {
    pub fn new(root: &Path) -> Self {
        fs::create_dir_all(root).unwrap();
        BuildFixture {
            root: root.to_path_buf(),
        }
    }

    /// Add a file at `rel` with placeholder contents.
    pub fn with_file(self, rel: &str) -> Self {
        write(&self.root, rel, rel);
        self
    }

    /// Linux static build output.
    pub fn linux_static(root: &Path) -> Self {
        BuildFixture::new(root)
            .with_file("lib/libsmelt.a")
            .with_file("CMakeFiles/smelt.dir/wittig_sinha.cc.o")
    }

    /// Linux shared build output.
    pub fn linux_shared(root: &Path) -> Self {
        BuildFixture::new(root)
            .with_file("lib/libsmelt.so")
            .with_file("bin/unitTests")
    }

    /// Windows shared build output from a multi-config generator.
    pub fn windows_shared(root: &Path) -> Self {
        BuildFixture::new(root)
            .with_file("Release/smelt.dll")
            .with_file("Release/smelt.lib")
            .with_file("Release/smelt.exp")
    }
}

/// Write `contents` to `root/rel`, creating parents.
pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// All files under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
