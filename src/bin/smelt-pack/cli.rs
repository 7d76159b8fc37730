//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// smelt-pack - build, test and package the SMELT time-history library
#[derive(Parser)]
#[command(name = "smelt-pack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, test and package the library for one target
    Build(BuildArgs),

    /// Show the CMake options planned for a target
    Plan(PlanArgs),

    /// Package every variant of the build matrix
    Matrix(MatrixArgs),

    /// Show how to consume a published package
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Target selection shared by several commands.
#[derive(Args, Clone, Default)]
pub struct TargetArgs {
    /// Build type (Debug, Release)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Library linkage (static, shared)
    #[arg(long)]
    pub linkage: Option<String>,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long)]
    pub compiler: Option<String>,
}

/// Options controlling how builds run.
#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Library source directory (must contain CMakeLists.txt)
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Root directory for per-variant output trees
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the test suite after building
    #[arg(long, conflicts_with = "no_test")]
    pub test: bool,

    /// Skip the test suite even if the config enables it
    #[arg(long)]
    pub no_test: bool,

    /// Package even if the test suite fails
    #[arg(long)]
    pub allow_test_failures: bool,

    /// Number of parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// CMake generator (e.g. Ninja)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Disable progress spinners
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Operating system to plan for (defaults to the host)
    #[arg(long)]
    pub os: Option<String>,

    /// Directory to read smelt-pack.toml from
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Print the options as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// List the variants without building them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package directory or package-info.json file
    pub path: PathBuf,

    /// Print the raw descriptor JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
