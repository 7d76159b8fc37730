//! Test utilities and mocks for smelt-pack unit tests.
//!
//! Provides scripted stand-ins for the native build tool and the test
//! runner, so the executor and pipeline can be exercised without CMake.
//!
//! # Example
//!
//! ```rust,ignore
//! use smelt_pack::test_support::{MockBuildTool, MockTestRunner};
//!
//! #[test]
//! fn test_example() {
//!     let mut tool = MockBuildTool::new().fail_build(2);
//!     let mut runner = MockTestRunner::new();
//!
//!     // Hand both to a BuildExecutor...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::plan::ConfigOptions;
use crate::builder::tool::{BuildTool, TestRunner};
use crate::core::environment::Environment;
use crate::core::target::BuildType;
use crate::util::process::ExitReport;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Scripted build tool.
///
/// Records every call and answers with preconfigured exit codes. Optionally
/// writes files into a build directory on `build()` to simulate outputs.
#[derive(Debug, Clone, Default)]
pub struct MockBuildTool {
    configure_code: i32,
    build_code: i32,
    outputs: Vec<(PathBuf, String)>,
    /// Options passed to the last `configure` call
    pub configured_with: Option<ConfigOptions>,
    /// Source directory passed to the last `configure` call
    pub configured_source: Option<PathBuf>,
    /// Calls in order: "configure" / "build"
    pub calls: Vec<&'static str>,
}

impl MockBuildTool {
    pub fn new() -> Self {
        MockBuildTool::default()
    }

    /// Make `configure` exit with `code`.
    pub fn fail_configure(mut self, code: i32) -> Self {
        self.configure_code = code;
        self
    }

    /// Make `build` exit with `code`.
    pub fn fail_build(mut self, code: i32) -> Self {
        self.build_code = code;
        self
    }

    /// Write `path` (absolute) with `contents` when `build` succeeds.
    pub fn produces(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.outputs
            .push((path.as_ref().to_path_buf(), contents.into()));
        self
    }
}

impl BuildTool for MockBuildTool {
    fn name(&self) -> &str {
        "mock"
    }

    fn configure(&mut self, options: &ConfigOptions, source_dir: &Path) -> Result<ExitReport> {
        self.calls.push("configure");
        self.configured_with = Some(options.clone());
        self.configured_source = Some(source_dir.to_path_buf());
        Ok(ExitReport::new("mock configure", Some(self.configure_code)))
    }

    fn build(&mut self) -> Result<ExitReport> {
        self.calls.push("build");
        if self.build_code == 0 {
            for (path, contents) in &self.outputs {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, contents)?;
            }
        }
        Ok(ExitReport::new("mock build", Some(self.build_code)))
    }
}

/// One recorded test-runner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTestRun {
    pub config: Option<BuildType>,
    /// Snapshot of the environment the runner was handed
    pub env: Vec<(String, String)>,
}

impl RecordedTestRun {
    /// Value of `key` in the recorded environment.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted test runner recording each invocation.
#[derive(Debug, Clone, Default)]
pub struct MockTestRunner {
    code: i32,
    pub runs: Vec<RecordedTestRun>,
}

impl MockTestRunner {
    pub fn new() -> Self {
        MockTestRunner::default()
    }

    /// Make every run exit with `code`.
    pub fn failing(code: i32) -> Self {
        MockTestRunner {
            code,
            runs: Vec::new(),
        }
    }
}

impl TestRunner for MockTestRunner {
    fn run(&mut self, config: Option<BuildType>, env: &dyn Environment) -> Result<ExitReport> {
        self.runs.push(RecordedTestRun {
            config,
            env: env.vars(),
        });
        Ok(ExitReport::new("mock test", Some(self.code)))
    }
}
