//! Consumption metadata publishing.

use std::io::Write;
use std::path::PathBuf;

use crate::builder::env_resolver::{resolve_runtime_env, PATH};
use crate::core::descriptor::{ConsumptionDescriptor, PackageInfo};
use crate::core::error::{IoContext, PackageError};
use crate::core::layout::PackageLayout;
use crate::core::target::{BuildTarget, CompilerFamily, Linkage, Os};

/// File suffixes recognized as libraries when scanning a package.
pub const LIBRARY_SUFFIXES: &[&str] = &["a", "lib", "so", "dylib", "dll"];

/// Flags every consumer compiles with: the library is built against the
/// 64-bit-integer MKL interface for 64-bit targets.
pub const COMPILER_FLAGS: &[&str] = &["-DMKL_ILP64", "-m64"];

const GCC_STATIC_LINK: &[&str] = &[
    "-static-libgcc",
    "-static-libstdc++",
    "-lpthread",
    "-lm",
    "-ldl",
];

const STATIC_LINK: &[&str] = &["-static-libstdc++", "-lpthread", "-lm", "-ldl"];

/// Extra linker flags a consumer needs for `target`.
pub fn linker_flags(target: &BuildTarget) -> Vec<String> {
    let flags: &[&str] = match (target.os, target.linkage, &target.compiler) {
        (Os::Linux, Linkage::Static, CompilerFamily::Gcc) => GCC_STATIC_LINK,
        (Os::Linux, Linkage::Static, _) => STATIC_LINK,
        (Os::Macos | Os::Windows, Linkage::Static, _) => &[],
        (_, Linkage::Shared, _) => &[],
    };
    flags.iter().map(|f| f.to_string()).collect()
}

/// Library name a file contributes, if it is a library at all.
fn library_name(file_name: &str) -> Option<String> {
    let (stem, suffix) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !LIBRARY_SUFFIXES.contains(&suffix) {
        return None;
    }

    let name = match suffix {
        "a" | "so" | "dylib" => stem.strip_prefix("lib").filter(|s| !s.is_empty()).unwrap_or(stem),
        _ => stem,
    };
    Some(name.to_string())
}

/// Scan `lib/` then `bin/` for libraries, in file name order, keeping the
/// first occurrence of each name.
pub fn discover_library_names(layout: &PackageLayout) -> Result<Vec<String>, PackageError> {
    let mut names: Vec<String> = Vec::new();

    for dir in [layout.lib_dir(), layout.bin_dir()] {
        if !dir.is_dir() {
            continue;
        }

        let mut entries: Vec<_> = std::fs::read_dir(&dir)
            .io_context(|| format!("failed to read directory: {}", dir.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();

        for entry in entries {
            if let Some(name) = library_name(&entry) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    Ok(names)
}

/// Build the descriptor for an installed package.
pub fn publish(
    target: &BuildTarget,
    layout: &PackageLayout,
    package: PackageInfo,
) -> Result<ConsumptionDescriptor, PackageError> {
    let library_names = discover_library_names(layout)?;

    let mut runtime_env = resolve_runtime_env(target, layout.root());
    if target.linkage == Linkage::Shared {
        // Helper executables shipped next to the library need it too
        runtime_env.append(PATH, layout.bin_dir());
    }

    Ok(ConsumptionDescriptor {
        package,
        target: target.clone(),
        library_names,
        include_dirs: vec![layout.include_dir()],
        lib_dirs: vec![layout.lib_dir()],
        bin_dirs: vec![layout.bin_dir()],
        linker_flags: linker_flags(target),
        compiler_flags: COMPILER_FLAGS.iter().map(|f| f.to_string()).collect(),
        runtime_env,
    })
}

/// Write the descriptor into the package as pretty JSON.
///
/// Written to a temporary file in the package root and renamed into place,
/// so readers never observe a half-written descriptor.
pub fn write_descriptor(
    descriptor: &ConsumptionDescriptor,
    layout: &PackageLayout,
) -> Result<PathBuf, PackageError> {
    let path = layout.descriptor_path();
    let json = serde_json::to_string_pretty(descriptor)
        .map_err(|e| PackageError::Other(anyhow::anyhow!("failed to serialize descriptor: {}", e)))?;

    let mut tmp = tempfile::NamedTempFile::new_in(layout.root())
        .io_context(|| format!("failed to create temp file in {}", layout.root().display()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.write_all(b"\n"))
        .io_context(|| format!("failed to write descriptor: {}", path.display()))?;
    tmp.persist(&path)
        .map_err(|e| PackageError::io(format!("failed to write descriptor: {}", path.display()), e.error))?;

    tracing::info!("Published {}", path.display());
    Ok(path)
}
