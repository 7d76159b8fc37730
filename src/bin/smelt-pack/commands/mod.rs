//! Command implementations

pub mod build;
pub mod completions;
pub mod info;
pub mod matrix;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{RunArgs, TargetArgs};
use smelt_pack::core::target::{BuildTarget, BuildType, CompilerFamily, Linkage, Os};
use smelt_pack::ops::package::PackageOptions;
use smelt_pack::util::config::{global_config_path, load_config, project_config_path, Config};

/// Default output root, relative to the source directory.
const DEFAULT_OUTPUT_DIR: &str = ".smelt-pack";

/// Load global + project configuration for a source directory.
pub fn load_project_config(source: &Path) -> Result<Config> {
    let global = global_config_path().unwrap_or_default();
    load_config(&global, &project_config_path(source))
}

/// Resolve a target for `os`: CLI flags, then config, then defaults.
pub fn resolve_target(args: &TargetArgs, config: &Config, os: Os) -> Result<BuildTarget> {
    let build_type = match &args.build_type {
        Some(s) => s.parse::<BuildType>()?,
        None => config.build_type()?.unwrap_or(BuildType::Release),
    };
    let linkage = match &args.linkage {
        Some(s) => s.parse::<Linkage>()?,
        None => config.linkage()?.unwrap_or(Linkage::Static),
    };
    let compiler = match &args.compiler {
        Some(s) => s.parse::<CompilerFamily>()?,
        None => config
            .compiler()?
            .unwrap_or_else(|| CompilerFamily::default_for(os)),
    };

    let target = BuildTarget::new(os, compiler, build_type, linkage);
    target.validate()?;
    Ok(target)
}

/// Assemble pipeline options from CLI flags and configuration.
pub fn package_options(
    target: BuildTarget,
    args: &RunArgs,
    config: &Config,
) -> Result<PackageOptions> {
    let source = absolute(&args.source)?;

    let output = args
        .output
        .clone()
        .or_else(|| config.build.output_dir.clone())
        .map(|p| if p.is_absolute() { p } else { source.join(p) })
        .unwrap_or_else(|| source.join(DEFAULT_OUTPUT_DIR));

    let run_tests = if args.no_test {
        false
    } else {
        args.test || config.build.run_tests.unwrap_or(false)
    };

    let mut opts = PackageOptions::new(target, source, output);
    opts.package = config.package.clone();
    opts.run_tests = run_tests;
    opts.allow_test_failures =
        args.allow_test_failures || config.build.allow_test_failures.unwrap_or(false);
    opts.jobs = args.jobs.or(config.build.jobs);
    opts.generator = args.generator.clone().or_else(|| config.build.generator.clone());
    opts.progress = !args.no_progress;
    Ok(opts)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve path: {}", path.display()))
}
