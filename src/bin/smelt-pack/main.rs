//! smelt-pack CLI - build, test and package the SMELT library

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("smelt_pack=debug")
    } else {
        EnvFilter::new("smelt_pack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Matrix(args) => commands::matrix::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
