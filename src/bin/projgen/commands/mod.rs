//! Command implementations

pub mod completions;
pub mod generate;
pub mod plan;

use anyhow::Result;

use projgen::core::config::Configuration;
use projgen::core::layout::Layout;
use projgen::util::config::{Config, CONFIG_FILE};

use crate::cli::{Cli, TargetArgs};

/// Build the configuration record: defaults, then the config file, then
/// command-line flags.
pub fn load_configuration(cli: &Cli, args: &TargetArgs) -> Result<Configuration> {
    let file = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&args.root.join(CONFIG_FILE))?,
    };

    let mut config = Configuration::new(Layout::new(&args.root));
    file.apply(&mut config);

    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    if let Some(toolchain) = args.toolchain {
        config.toolchain = toolchain;
    }
    if let Some(solution_type) = args.solution_type {
        config.solution_type = solution_type;
    }
    if let Some(quantum_depth) = args.quantum_depth {
        config.quantum_depth = quantum_depth;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    for feature in &args.enable {
        feature.set(&mut config.features, true);
    }
    for feature in &args.disable {
        feature.set(&mut config.features, false);
    }
    if !args.write_prefixes.is_empty() {
        config.write_prefixes = args.write_prefixes.clone();
    }

    tracing::debug!(
        "configuration: {} {} {} Q{}",
        config.platform,
        config.toolchain,
        config.solution_name(),
        config.quantum_depth.bits()
    );
    Ok(config)
}
