//! Environment resolution for freshly built shared libraries.

use std::path::Path;

use crate::core::environment::RuntimeEnvironmentPatch;
use crate::core::target::{BuildTarget, Linkage, Os};

/// Dynamic-loader search variable on macOS.
pub const DYLD_LIBRARY_PATH: &str = "DYLD_LIBRARY_PATH";
/// Dynamic-loader search variable on Linux.
pub const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
/// Executable search variable; also how Windows locates DLLs.
pub const PATH: &str = "PATH";

/// Variable through which `os` finds shared libraries, and the package
/// subdirectory holding them.
pub fn loader_variable(os: Os) -> (&'static str, &'static str) {
    match os {
        Os::Macos => (DYLD_LIBRARY_PATH, "lib"),
        Os::Linux => (LD_LIBRARY_PATH, "lib"),
        Os::Windows => (PATH, "bin"),
    }
}

/// Environment additions needed to load the shared library built for
/// `target` out of `root`. Empty for static builds.
pub fn resolve_runtime_env(target: &BuildTarget, root: &Path) -> RuntimeEnvironmentPatch {
    let mut patch = RuntimeEnvironmentPatch::new(target.os);

    if target.linkage == Linkage::Shared {
        let (var, subdir) = loader_variable(target.os);
        patch.append(var, root.join(subdir));
    }

    patch
}
