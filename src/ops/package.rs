//! The packaging pipeline: plan, build, test, collect, publish.

use std::path::{Path, PathBuf};

use crate::builder::cmake::{CMakeTool, CTestRunner};
use crate::builder::executor::{BuildExecutor, BuildState};
use crate::builder::plan::plan_configuration;
use crate::builder::tool::{BuildTool, NoTestRunner, TestRunner};
use crate::core::descriptor::ConsumptionDescriptor;
use crate::core::environment::{Environment, ProcessEnvironment};
use crate::core::error::PackageError;
use crate::core::layout::PackageLayout;
use crate::core::target::BuildTarget;
use crate::ops::collect::{collect_package, CollectReport};
use crate::ops::publish::{publish, write_descriptor};
use crate::sources::{PathSource, Source};
use crate::util::config::PackageConfig;

/// Options for packaging one target.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub target: BuildTarget,

    /// Library source tree
    pub source_dir: PathBuf,

    /// Root under which the per-variant tree is created
    pub output_dir: PathBuf,

    /// Package metadata and source exports
    pub package: PackageConfig,

    /// Run the test suite after building
    pub run_tests: bool,

    /// Package even when the test suite fails
    pub allow_test_failures: bool,

    /// CMake generator
    pub generator: Option<String>,

    /// Parallel build jobs
    pub jobs: Option<usize>,

    /// Show stage spinners
    pub progress: bool,
}

impl PackageOptions {
    pub fn new(target: BuildTarget, source_dir: PathBuf, output_dir: PathBuf) -> Self {
        PackageOptions {
            target,
            source_dir,
            output_dir,
            package: PackageConfig::default(),
            run_tests: false,
            allow_test_failures: false,
            generator: None,
            jobs: None,
            progress: false,
        }
    }

    /// The exclusive output tree of this variant.
    pub fn paths(&self) -> VariantPaths {
        VariantPaths::new(&self.output_dir, &self.target)
    }
}

/// Directories owned by one variant build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPaths {
    pub root: PathBuf,
    /// Exported copy of the sources
    pub source: PathBuf,
    /// Native build tree
    pub build: PathBuf,
    /// Package layout root
    pub package: PathBuf,
}

impl VariantPaths {
    pub fn new(output_dir: &Path, target: &BuildTarget) -> Self {
        let root = output_dir.join(target.variant_name());
        VariantPaths {
            source: root.join("source"),
            build: root.join("build"),
            package: root.join("package"),
            root,
        }
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PackageResult {
    pub target: BuildTarget,
    /// Final executor state
    pub state: BuildState,
    /// Set when tests failed but packaging went ahead anyway
    pub test_failure: Option<String>,
    pub layout: PackageLayout,
    pub collected: CollectReport,
    pub descriptor: ConsumptionDescriptor,
    pub descriptor_path: PathBuf,
}

/// Run the whole pipeline for one target with the given collaborators.
pub fn package(
    opts: &PackageOptions,
    tool: &mut dyn BuildTool,
    runner: &mut dyn TestRunner,
    env: &mut dyn Environment,
) -> Result<PackageResult, PackageError> {
    let target = &opts.target;
    let paths = opts.paths();

    // Rejects bad targets before any process starts
    let options = plan_configuration(target)?;

    let source = PathSource::new(opts.source_dir.clone(), opts.package.exports.clone());
    tracing::debug!("Using {} source at {}", source.name(), source.root().display());
    let source_dir = source.export(&paths.source)?;

    let mut executor = BuildExecutor::new(target, source_dir.clone(), paths.build.clone())
        .run_tests(opts.run_tests)
        .progress(opts.progress);

    let test_failure = match executor.execute(&options, tool, runner, env) {
        Ok(_) => None,
        Err(e) if e.is_test_failure() && opts.allow_test_failures => {
            tracing::warn!("{}; packaging anyway", e);
            Some(e.to_string())
        }
        Err(e) => return Err(e),
    };

    let layout = PackageLayout::new(&paths.package);
    let collected = collect_package(target, &source_dir, &paths.build, &layout)?;

    let descriptor = publish(target, &layout, opts.package.to_info())?;
    let descriptor_path = write_descriptor(&descriptor, &layout)?;

    Ok(PackageResult {
        target: target.clone(),
        state: executor.state(),
        test_failure,
        layout,
        collected,
        descriptor,
        descriptor_path,
    })
}

/// Run the pipeline with CMake, CTest and the process environment.
pub fn package_with_cmake(opts: &PackageOptions) -> Result<PackageResult, PackageError> {
    plan_configuration(&opts.target)?;

    let paths = opts.paths();
    let mut tool = CMakeTool::new(paths.build.clone(), opts.target.build_type)?
        .generator(opts.generator.clone())
        .jobs(opts.jobs);
    let mut env = ProcessEnvironment;

    if opts.run_tests {
        let mut runner = CTestRunner::new(paths.build)?;
        package(opts, &mut tool, &mut runner, &mut env)
    } else {
        package(opts, &mut tool, &mut NoTestRunner, &mut env)
    }
}
