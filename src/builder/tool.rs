//! Collaborator interfaces for the native build tool and the test runner.
//!
//! Both are external processes; the pipeline only ever observes the command
//! line that ran and its exit code.

use std::path::Path;

use anyhow::Result;

use crate::builder::plan::ConfigOptions;
use crate::core::environment::Environment;
use crate::core::target::BuildType;
use crate::util::process::ExitReport;

/// Native build tool driven by the executor.
///
/// An `Err` means the tool could not be run at all; a non-zero exit is
/// reported through the returned [`ExitReport`].
pub trait BuildTool {
    /// Tool name for log output.
    fn name(&self) -> &str;

    /// Configure a build tree for `source_dir` with the planned options.
    fn configure(&mut self, options: &ConfigOptions, source_dir: &Path) -> Result<ExitReport>;

    /// Build the configured tree.
    fn build(&mut self) -> Result<ExitReport>;
}

/// Test runner invoked after a successful build.
pub trait TestRunner {
    /// Run the test suite.
    ///
    /// `config` names the configuration to test in a multi-config build
    /// tree; `env` is the exact environment the test process receives.
    fn run(&mut self, config: Option<BuildType>, env: &dyn Environment) -> Result<ExitReport>;
}

/// Runner used when tests were not requested. Never expected to be called.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTestRunner;

impl TestRunner for NoTestRunner {
    fn run(&mut self, _config: Option<BuildType>, _env: &dyn Environment) -> Result<ExitReport> {
        anyhow::bail!("tests were not requested for this build")
    }
}
