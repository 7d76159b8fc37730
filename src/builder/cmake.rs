//! CMake and CTest adapters.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::plan::ConfigOptions;
use crate::builder::tool::{BuildTool, TestRunner};
use crate::core::environment::Environment;
use crate::core::target::BuildType;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, find_ctest, ExitReport, ProcessBuilder};

/// CMake build adapter.
pub struct CMakeTool {
    cmake: PathBuf,
    build_dir: PathBuf,
    build_type: BuildType,
    generator: Option<String>,
    jobs: Option<usize>,
}

impl CMakeTool {
    /// Create a new CMake adapter building into `build_dir`.
    pub fn new(build_dir: PathBuf, build_type: BuildType) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build the library.\n\
                 Install CMake and ensure it's in your PATH."
            );
        };

        Ok(CMakeTool {
            cmake,
            build_dir,
            build_type,
            generator: None,
            jobs: None,
        })
    }

    /// Use a specific CMake generator.
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Limit parallel build jobs.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    fn configure_command(&self, options: &ConfigOptions, source_dir: &Path) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(source_dir)
            .arg("-B")
            .arg(&self.build_dir);

        if let Some(ref generator) = self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        cmd.args(options.to_define_args())
    }

    fn build_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&self.build_dir)
            // Multi-config generators (Visual Studio, Xcode) need this
            .arg("--config")
            .arg(self.build_type.as_str())
            .arg("--parallel");

        if let Some(jobs) = self.jobs {
            cmd = cmd.arg(jobs.to_string());
        }

        cmd
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&mut self, options: &ConfigOptions, source_dir: &Path) -> Result<ExitReport> {
        ensure_dir(&self.build_dir)?;
        tracing::info!("Configuring CMake project in {}", self.build_dir.display());

        self.configure_command(options, source_dir).run()
    }

    fn build(&mut self) -> Result<ExitReport> {
        tracing::info!("Building CMake project");

        self.build_command().run()
    }
}

/// CTest runner for a CMake build tree.
pub struct CTestRunner {
    ctest: PathBuf,
    build_dir: PathBuf,
}

impl CTestRunner {
    pub fn new(build_dir: PathBuf) -> Result<Self> {
        let ctest = find_ctest()
            .context("CTest not found; it ships with CMake, ensure it's in your PATH")?;
        Ok(CTestRunner { ctest, build_dir })
    }

    fn command(&self, config: Option<BuildType>, env: &dyn Environment) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.ctest)
            .arg("--test-dir")
            .arg(&self.build_dir)
            .arg("--output-on-failure");

        if let Some(config) = config {
            cmd = cmd.arg("-C").arg(config.as_str());
        }

        // The child sees exactly the environment it was handed
        cmd.env_clear().envs(env.vars())
    }
}

impl TestRunner for CTestRunner {
    fn run(&mut self, config: Option<BuildType>, env: &dyn Environment) -> Result<ExitReport> {
        tracing::info!("Running tests");

        self.command(config, env).run()
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
