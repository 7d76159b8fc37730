//! Build executor: configure, build and optionally test.
//!
//! ```text
//! Configured --build ok--> Built --tests ok--> Tested
//!     |                      |
//!     +------ failure -------+----> Failed
//! ```
//!
//! `Failed` is terminal; callers must not collect a package from a failed
//! build.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::env_resolver::resolve_runtime_env;
use crate::builder::plan::ConfigOptions;
use crate::builder::tool::{BuildTool, TestRunner};
use crate::core::environment::{with_patch, Environment};
use crate::core::error::{BuildStage, PackageError};
use crate::core::target::{BuildTarget, BuildType, Linkage, Os};
use crate::util::process::ExitReport;

/// Where CMake writes static archives (and Windows import libraries).
pub const ARCHIVE_OUTPUT_DIRECTORY: &str = "CMAKE_ARCHIVE_OUTPUT_DIRECTORY";
/// Where CMake writes shared objects and dylibs.
pub const LIBRARY_OUTPUT_DIRECTORY: &str = "CMAKE_LIBRARY_OUTPUT_DIRECTORY";
/// Where CMake writes executables and DLLs.
pub const RUNTIME_OUTPUT_DIRECTORY: &str = "CMAKE_RUNTIME_OUTPUT_DIRECTORY";

/// Executor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Configured,
    Built,
    Tested,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::Configured => "configured",
            BuildState::Built => "built",
            BuildState::Tested => "tested",
            BuildState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How the test runner is invoked for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestInvocation {
    /// Multi-config build tree: name the configuration explicitly.
    PerConfig(BuildType),
    /// Freshly built dylib is not on any loader path yet: run with the
    /// loader variable augmented for the duration of the run.
    WithLoaderPath,
    /// Ambient environment, no extra arguments.
    Plain,
}

/// Select the test invocation form for a target.
pub fn test_invocation(target: &BuildTarget) -> TestInvocation {
    match (target.os, target.linkage) {
        (Os::Windows, _) => TestInvocation::PerConfig(target.build_type),
        (Os::Macos, Linkage::Shared) => TestInvocation::WithLoaderPath,
        (Os::Macos, Linkage::Static) | (Os::Linux, _) => TestInvocation::Plain,
    }
}

/// Runs the native build for one target.
pub struct BuildExecutor<'a> {
    target: &'a BuildTarget,
    source_dir: PathBuf,
    build_dir: PathBuf,
    run_tests: bool,
    progress: bool,
    state: BuildState,
}

impl<'a> BuildExecutor<'a> {
    /// Create a new build executor.
    pub fn new(target: &'a BuildTarget, source_dir: PathBuf, build_dir: PathBuf) -> Self {
        BuildExecutor {
            target,
            source_dir,
            build_dir,
            run_tests: false,
            progress: false,
            state: BuildState::Configured,
        }
    }

    /// Run the test suite after building.
    pub fn run_tests(mut self, run_tests: bool) -> Self {
        self.run_tests = run_tests;
        self
    }

    /// Show a spinner while stages run.
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Drive the state machine to a terminal state.
    pub fn execute(
        &mut self,
        options: &ConfigOptions,
        tool: &mut dyn BuildTool,
        runner: &mut dyn TestRunner,
        env: &mut dyn Environment,
    ) -> Result<BuildState, PackageError> {
        if self.state != BuildState::Configured {
            return Err(PackageError::invalid(format!(
                "executor for {} already ran (state: {})",
                self.target, self.state
            )));
        }

        let start = Instant::now();

        if let Err(e) = self.build(options, tool) {
            self.state = BuildState::Failed;
            return Err(e);
        }
        self.state = BuildState::Built;

        if self.run_tests {
            if let Err(e) = self.test(runner, env) {
                self.state = BuildState::Failed;
                return Err(e);
            }
            self.state = BuildState::Tested;
        } else {
            tracing::debug!("Skipping tests for {}", self.target);
        }

        tracing::info!(
            "Finished {} ({}) in {:.2}s",
            self.target,
            self.state,
            start.elapsed().as_secs_f64()
        );
        Ok(self.state)
    }

    fn build(&self, options: &ConfigOptions, tool: &mut dyn BuildTool) -> Result<(), PackageError> {
        let mut options = options.clone();
        options.set("BUILD_TESTING", if self.run_tests { "ON" } else { "OFF" });

        // Pin outputs to the directories the test-time loader patch points at
        let lib_dir = self.build_dir.join("lib").display().to_string();
        let bin_dir = self.build_dir.join("bin").display().to_string();
        options.set(ARCHIVE_OUTPUT_DIRECTORY, lib_dir.as_str());
        options.set(LIBRARY_OUTPUT_DIRECTORY, lib_dir);
        options.set(RUNTIME_OUTPUT_DIRECTORY, bin_dir);

        let spinner = self.spinner(format!("Configuring {}", self.target));
        let report = tool.configure(&options, &self.source_dir);
        finish(spinner);
        check_build(report?, BuildStage::Configure)?;

        let spinner = self.spinner(format!("Building {} with {}", self.target, tool.name()));
        let report = tool.build();
        finish(spinner);
        check_build(report?, BuildStage::Build)
    }

    fn test(&self, runner: &mut dyn TestRunner, env: &mut dyn Environment) -> Result<(), PackageError> {
        let invocation = test_invocation(self.target);
        tracing::debug!("Test invocation for {}: {:?}", self.target, invocation);

        let spinner = self.spinner(format!("Testing {}", self.target));
        let (report, config) = match invocation {
            TestInvocation::PerConfig(build_type) => {
                (runner.run(Some(build_type), &*env), Some(build_type))
            }
            TestInvocation::WithLoaderPath => {
                let patch = resolve_runtime_env(self.target, &self.build_dir);
                (with_patch(env, &patch, |env| runner.run(None, env)), None)
            }
            TestInvocation::Plain => (runner.run(None, &*env), None),
        };
        finish(spinner);

        let report = report?;
        if report.success() {
            Ok(())
        } else {
            Err(PackageError::TestsFailed {
                command: report.command,
                code: report.code,
                config: config.map(|c| c.as_str().to_string()),
            })
        }
    }

    fn spinner(&self, msg: String) -> Option<ProgressBar> {
        if !self.progress {
            tracing::info!("{}", msg);
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(msg);
        Some(pb)
    }
}

fn finish(spinner: Option<ProgressBar>) {
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

fn check_build(report: ExitReport, stage: BuildStage) -> Result<(), PackageError> {
    if report.success() {
        Ok(())
    } else {
        Err(PackageError::BuildFailed {
            stage,
            command: report.command,
            code: report.code,
        })
    }
}
