//! Consumption descriptor - everything a downstream build reads to link
//! against and run with a package.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::environment::RuntimeEnvironmentPatch;
use crate::core::target::BuildTarget;

/// Package identity recorded alongside the link surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Dependency references the package was built against
    #[serde(default)]
    pub requires: Vec<String>,
}

/// The published output of a successful package build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionDescriptor {
    pub package: PackageInfo,
    pub target: BuildTarget,
    /// Library names in discovery order, without prefix or suffix
    pub library_names: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub bin_dirs: Vec<PathBuf>,
    pub linker_flags: Vec<String>,
    pub compiler_flags: Vec<String>,
    pub runtime_env: RuntimeEnvironmentPatch,
}

impl ConsumptionDescriptor {
    /// Flags a consumer passes to the linker: search paths, libraries, then
    /// the platform-specific extras.
    pub fn link_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .lib_dirs
            .iter()
            .map(|d| format!("-L{}", d.display()))
            .collect();
        args.extend(self.library_names.iter().map(|n| format!("-l{}", n)));
        args.extend(self.linker_flags.iter().cloned());
        args
    }

    /// Flags a consumer passes to the compiler.
    pub fn compile_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .include_dirs
            .iter()
            .map(|d| format!("-I{}", d.display()))
            .collect();
        args.extend(self.compiler_flags.iter().cloned());
        args
    }

    /// Load a previously published descriptor.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read descriptor: {}", path.display()))?;
        let mut descriptor: ConsumptionDescriptor = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse descriptor: {}", path.display()))?;
        descriptor.runtime_env.set_os(descriptor.target.os);
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::{BuildType, CompilerFamily, Linkage, Os};

    fn descriptor() -> ConsumptionDescriptor {
        ConsumptionDescriptor {
            package: PackageInfo {
                name: "smelt".to_string(),
                version: "1.1".to_string(),
                ..Default::default()
            },
            target: BuildTarget::new(
                Os::Linux,
                CompilerFamily::Gcc,
                BuildType::Release,
                Linkage::Static,
            ),
            library_names: vec!["smelt".to_string()],
            include_dirs: vec![PathBuf::from("/pkg/include")],
            lib_dirs: vec![PathBuf::from("/pkg/lib")],
            bin_dirs: vec![PathBuf::from("/pkg/bin")],
            linker_flags: vec!["-lpthread".to_string()],
            compiler_flags: vec!["-m64".to_string()],
            runtime_env: RuntimeEnvironmentPatch::new(Os::Linux),
        }
    }

    #[test]
    fn test_link_args_order() {
        assert_eq!(
            descriptor().link_args(),
            vec!["-L/pkg/lib", "-lsmelt", "-lpthread"]
        );
    }

    #[test]
    fn test_compile_args() {
        assert_eq!(descriptor().compile_args(), vec!["-I/pkg/include", "-m64"]);
    }

    #[test]
    fn test_load_published_descriptor() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("package-info.json");
        let original = descriptor();
        std::fs::write(&path, serde_json::to_string_pretty(&original).unwrap()).unwrap();

        let loaded = ConsumptionDescriptor::load(&path).unwrap();
        assert_eq!(loaded.library_names, original.library_names);
        assert_eq!(loaded.target, original.target);
    }

    #[test]
    fn test_loaded_windows_descriptor_joins_with_semicolon() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("package-info.json");

        let mut original = descriptor();
        original.target = BuildTarget::new(
            Os::Windows,
            CompilerFamily::Msvc,
            BuildType::Release,
            Linkage::Shared,
        );
        original.runtime_env = RuntimeEnvironmentPatch::new(Os::Windows);
        original.runtime_env.append("PATH", "C:/pkg/bin");
        std::fs::write(&path, serde_json::to_string_pretty(&original).unwrap()).unwrap();

        let loaded = ConsumptionDescriptor::load(&path).unwrap();
        assert_eq!(loaded.runtime_env.separator(), ';');
        assert_eq!(
            loaded.runtime_env.appended_value("PATH", Some("C:/Windows")),
            Some("C:/Windows;C:/pkg/bin".to_string())
        );
        assert_eq!(loaded, original);
    }
}
