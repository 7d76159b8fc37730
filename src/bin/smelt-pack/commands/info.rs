//! `smelt-pack info` command

use anyhow::Result;

use crate::cli::InfoArgs;
use smelt_pack::core::descriptor::ConsumptionDescriptor;
use smelt_pack::core::layout::PackageLayout;

pub fn execute(args: InfoArgs) -> Result<()> {
    let path = if args.path.is_dir() {
        PackageLayout::new(&args.path).descriptor_path()
    } else {
        args.path.clone()
    };

    let desc = ConsumptionDescriptor::load(&path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&desc)?);
        return Ok(());
    }

    println!("{} v{}", desc.package.name, desc.package.version);
    println!("target: {}", desc.target);
    println!("libraries: {}", desc.library_names.join(" "));
    println!("compile: {}", desc.compile_args().join(" "));
    println!("link: {}", desc.link_args().join(" "));

    if !desc.runtime_env.is_empty() {
        println!("runtime environment:");
        for (var, fragments) in desc.runtime_env.iter() {
            let joined = fragments
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(&desc.runtime_env.separator().to_string());
            println!("  {}+={}", var, joined);
        }
    }

    Ok(())
}
