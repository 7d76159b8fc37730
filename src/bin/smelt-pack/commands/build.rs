//! `smelt-pack build` command

use anyhow::Result;

use super::{load_project_config, package_options, resolve_target};
use crate::cli::BuildArgs;
use smelt_pack::core::target::Os;
use smelt_pack::ops::package::{package_with_cmake, PackageResult};

pub fn execute(args: BuildArgs) -> Result<()> {
    let config = load_project_config(&args.run.source)?;
    let target = resolve_target(&args.target, &config, Os::host())?;
    let opts = package_options(target, &args.run, &config)?;

    let result = package_with_cmake(&opts)?;
    report(&result);

    Ok(())
}

/// Print a short summary of a finished package.
pub fn report(result: &PackageResult) {
    eprintln!(
        "    Packaged {} v{} ({})",
        result.descriptor.package.name,
        result.descriptor.package.version,
        result.target.variant_name()
    );
    eprintln!("      layout: {}", result.layout.root().display());
    eprintln!("   libraries: {}", result.descriptor.library_names.join(", "));
    eprintln!(" descriptor: {}", result.descriptor_path.display());

    if let Some(failure) = &result.test_failure {
        eprintln!("    warning: {}", failure);
    }
}
