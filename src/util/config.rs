//! Configuration file support for smelt-pack.
//!
//! Two configuration file locations are read:
//! - Global: `<config dir>/smelt-pack/config.toml` - User-wide defaults
//! - Project: `smelt-pack.toml` next to the library sources
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::descriptor::PackageInfo;
use crate::core::error::PackageError;
use crate::core::target::{BuildType, CompilerFamily, Linkage};

/// Project configuration file name.
pub const PROJECT_CONFIG_NAME: &str = "smelt-pack.toml";

/// smelt-pack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package metadata
    pub package: PackageConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Variants built by `smelt-pack matrix`
    pub matrix: MatrixConfig,
}

/// Package metadata recorded in the published descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,

    /// Dependency references the library is built against
    pub requires: Vec<String>,

    /// Source globs exported into the build-owned source tree
    pub exports: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            name: "smelt".to_string(),
            version: "1.1".to_string(),
            description: Some(
                "Stochastic, Modular, and Extensible Library for Time histories".to_string(),
            ),
            license: Some("BSD-2-Clause".to_string()),
            url: Some("https://github.com/NHERI-SimCenter/smelt".to_string()),
            requires: Vec::new(),
            exports: default_exports(),
        }
    }
}

fn default_exports() -> Vec<String> {
    ["src/*", "include/*", "CMakeLists.txt", "cmake/*", "test/*", "external/*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl PackageConfig {
    pub fn to_info(&self) -> PackageInfo {
        PackageInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            license: self.license.clone(),
            url: self.url.clone(),
            requires: self.requires.clone(),
        }
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default build type (Debug, Release)
    pub build_type: Option<String>,

    /// Default library linkage (static, shared)
    pub linkage: Option<String>,

    /// Compiler family (gcc, clang, apple-clang, msvc, ...)
    pub compiler: Option<String>,

    /// Run the test suite after building
    pub run_tests: Option<bool>,

    /// Package even when the test suite fails
    pub allow_test_failures: Option<bool>,

    /// Number of parallel build jobs (None = let CMake decide)
    pub jobs: Option<usize>,

    /// CMake generator
    pub generator: Option<String>,

    /// Root of per-variant output trees
    pub output_dir: Option<PathBuf>,
}

/// Build matrix configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub build_types: Vec<String>,
    pub linkages: Vec<String>,
    pub compilers: Vec<String>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        MatrixConfig {
            build_types: vec!["Release".to_string(), "Debug".to_string()],
            linkages: vec!["static".to_string()],
            compilers: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Package metadata and the matrix are taken whole from `other`, since a
    /// project file that has them describes its own package.
    pub fn merge(&mut self, other: Config, other_raw: &toml::Table) {
        if other_raw.contains_key("package") {
            self.package = other.package;
        }
        if other_raw.contains_key("matrix") {
            self.matrix = other.matrix;
        }

        let build = other.build;
        if build.build_type.is_some() {
            self.build.build_type = build.build_type;
        }
        if build.linkage.is_some() {
            self.build.linkage = build.linkage;
        }
        if build.compiler.is_some() {
            self.build.compiler = build.compiler;
        }
        if build.run_tests.is_some() {
            self.build.run_tests = build.run_tests;
        }
        if build.allow_test_failures.is_some() {
            self.build.allow_test_failures = build.allow_test_failures;
        }
        if build.jobs.is_some() {
            self.build.jobs = build.jobs;
        }
        if build.generator.is_some() {
            self.build.generator = build.generator;
        }
        if build.output_dir.is_some() {
            self.build.output_dir = build.output_dir;
        }
    }

    /// Parse build type from config string.
    pub fn build_type(&self) -> Result<Option<BuildType>, PackageError> {
        self.build.build_type.as_deref().map(str::parse).transpose()
    }

    /// Parse linkage from config string.
    pub fn linkage(&self) -> Result<Option<Linkage>, PackageError> {
        self.build.linkage.as_deref().map(str::parse).transpose()
    }

    /// Parse compiler family from config string.
    pub fn compiler(&self) -> Result<Option<CompilerFamily>, PackageError> {
        self.build.compiler.as_deref().map(str::parse).transpose()
    }
}

/// Read one config file as the typed config plus its raw table, which
/// tells the merge which sections the file actually has.
fn read_layer(path: &Path) -> Result<(Config, toml::Table)> {
    let config = Config::load(path)?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?
        .parse::<toml::Table>()
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok((config, raw))
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`smelt-pack.toml`)
/// 2. Global config
/// 3. Defaults
///
/// A broken global file is skipped with a warning. A broken project file
/// is an error, since it would otherwise change what gets packaged.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if global_path.exists() {
        match read_layer(global_path) {
            Ok((global, raw)) => config.merge(global, &raw),
            Err(e) => tracing::warn!("Ignoring global config: {:#}", e),
        }
    }

    if project_path.exists() {
        let (project, raw) = read_layer(project_path)?;
        config.merge(project, &raw);
    }

    Ok(config)
}

/// Get the global config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "smelt-pack").map(|d| d.config_dir().to_path_buf())
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path for a source directory.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}
