//! Build matrices: several variants of the library packaged in one run.

use crate::core::error::PackageError;
use crate::core::target::{BuildTarget, BuildType, CompilerFamily, Linkage, Os};
use crate::ops::package::{PackageOptions, PackageResult};
use crate::util::config::MatrixConfig;

/// Expand a matrix into concrete targets for `os`.
///
/// Order is compilers, then linkages, then build types, as listed. An empty
/// compiler list means the platform default. Combinations that fail
/// validation are skipped with a warning; any unparsable entry is an error.
pub fn expand(matrix: &MatrixConfig, os: Os) -> Result<Vec<BuildTarget>, PackageError> {
    let build_types = parse_all::<BuildType>(&matrix.build_types)?;
    let linkages = parse_all::<Linkage>(&matrix.linkages)?;
    let compilers = if matrix.compilers.is_empty() {
        vec![CompilerFamily::default_for(os)]
    } else {
        parse_all::<CompilerFamily>(&matrix.compilers)?
    };

    let mut targets = Vec::new();
    for compiler in &compilers {
        for &linkage in &linkages {
            for &build_type in &build_types {
                let target = BuildTarget::new(os, compiler.clone(), build_type, linkage);
                if let Err(e) = target.validate() {
                    tracing::warn!("Skipping {}: {}", target, e);
                    continue;
                }
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
    }

    if targets.is_empty() {
        return Err(PackageError::invalid(format!(
            "build matrix has no valid variant for {}",
            os
        )));
    }
    Ok(targets)
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>, PackageError>
where
    T: std::str::FromStr<Err = PackageError>,
{
    values.iter().map(|v| v.parse()).collect()
}

/// Package every target in order, stopping at the first failure.
///
/// `base` supplies everything but the target; `run` performs one pipeline
/// run (normally [`crate::ops::package::package_with_cmake`]).
pub fn run_matrix<F>(
    targets: &[BuildTarget],
    base: &PackageOptions,
    mut run: F,
) -> Result<Vec<PackageResult>, PackageError>
where
    F: FnMut(&PackageOptions) -> Result<PackageResult, PackageError>,
{
    let mut results = Vec::with_capacity(targets.len());

    for (i, target) in targets.iter().enumerate() {
        tracing::info!("[{}/{}] {}", i + 1, targets.len(), target);

        let mut opts = base.clone();
        opts.target = target.clone();
        results.push(run(&opts)?);
    }

    Ok(results)
}
