//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use projgen::core::config::{
    Features, Platform, PolicyPreset, QuantumDepth, SolutionType, ToolchainVersion,
};

/// projgen - CMake project generator for multi-module C/C++ trees
#[derive(Parser)]
#[command(name = "projgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors; no progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to <root>/projgen.toml when present)
    #[arg(long, global = true, env = "PROJGEN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write every descriptor and derived artifact
    Generate(GenerateArgs),

    /// Discover and check variants, then print them as JSON
    Plan(PlanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Configuration choices shared by `generate` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Source tree root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Target platform (x86, x64, arm64)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Toolchain version (2017, 2019, 2022)
    #[arg(long)]
    pub toolchain: Option<ToolchainVersion>,

    /// Solution type (static-mt, static-mtd, dynamic-mt)
    #[arg(long)]
    pub solution_type: Option<SolutionType>,

    /// Quantum depth (8, 16, 32, 64)
    #[arg(long)]
    pub quantum_depth: Option<QuantumDepth>,

    /// Security policy preset (limited, open, secure, websafe)
    #[arg(long)]
    pub policy: Option<PolicyPreset>,

    /// Enable a feature (repeatable)
    #[arg(long, value_enum)]
    pub enable: Vec<Feature>,

    /// Disable a feature (repeatable)
    #[arg(long, value_enum)]
    pub disable: Vec<Feature>,

    /// Variant prefix to write (repeatable; defaults to CORE)
    #[arg(long = "write-prefix")]
    pub write_prefixes: Vec<String>,
}

/// A toggleable feature.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Hdri,
    Openmp,
    Opencl,
    Dpc,
    ExcludeDeprecated,
    InstalledSupport,
    ZeroConfiguration,
    IncludeOptional,
    IncludeIncompatibleLicense,
}

impl Feature {
    pub fn set(self, features: &mut Features, enabled: bool) {
        let flag = match self {
            Feature::Hdri => &mut features.hdri,
            Feature::Openmp => &mut features.openmp,
            Feature::Opencl => &mut features.opencl,
            Feature::Dpc => &mut features.dpc,
            Feature::ExcludeDeprecated => &mut features.exclude_deprecated,
            Feature::InstalledSupport => &mut features.installed_support,
            Feature::ZeroConfiguration => &mut features.zero_configuration,
            Feature::IncludeOptional => &mut features.include_optional,
            Feature::IncludeIncompatibleLicense => &mut features.include_incompatible_license,
        };
        *flag = enabled;
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only list variants that get a descriptor
    #[arg(long)]
    pub written_only: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
