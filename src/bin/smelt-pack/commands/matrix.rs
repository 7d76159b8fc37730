//! `smelt-pack matrix` command

use anyhow::Result;

use super::{load_project_config, package_options};
use crate::cli::MatrixArgs;
use smelt_pack::core::target::Os;
use smelt_pack::ops::matrix::{expand, run_matrix};
use smelt_pack::ops::package::package_with_cmake;

pub fn execute(args: MatrixArgs) -> Result<()> {
    let config = load_project_config(&args.run.source)?;
    let targets = expand(&config.matrix, Os::host())?;

    if args.dry_run {
        for target in &targets {
            println!("{}", target.variant_name());
        }
        return Ok(());
    }

    let base = package_options(targets[0].clone(), &args.run, &config)?;
    let results = run_matrix(&targets, &base, package_with_cmake)?;

    for result in &results {
        super::build::report(result);
    }
    eprintln!("    Finished {} variant(s)", results.len());

    Ok(())
}
