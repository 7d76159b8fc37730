//! `smelt-pack plan` command

use anyhow::Result;
use serde::Serialize;

use super::{load_project_config, resolve_target};
use crate::cli::PlanArgs;
use smelt_pack::builder::plan::{plan_configuration, ConfigOptions};
use smelt_pack::core::target::{BuildTarget, Os};

/// JSON shape of `plan --json`.
#[derive(Serialize)]
struct PlanOutput<'a> {
    target: &'a BuildTarget,
    variant: String,
    options: &'a ConfigOptions,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let config = load_project_config(&args.source)?;
    let os = match &args.os {
        Some(s) => s.parse::<Os>()?,
        None => Os::host(),
    };

    let target = resolve_target(&args.target, &config, os)?;
    let options = plan_configuration(&target)?;

    if args.json {
        let out = PlanOutput {
            target: &target,
            variant: target.variant_name(),
            options: &options,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("# {}", target);
        print!("{}", options);
    }

    Ok(())
}
