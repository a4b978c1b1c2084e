//! `projgen plan` command
//!
//! Prints the checked variant set as JSON without writing anything.

use anyhow::{Context, Result};

use crate::cli::{Cli, PlanArgs};
use crate::commands::load_configuration;

pub fn execute(cli: &Cli, args: &PlanArgs) -> Result<()> {
    let config = load_configuration(cli, &args.target)?;

    let mut plan = projgen::plan(&config)?;
    if args.written_only {
        plan.retain(|variant| variant.descriptor.is_some());
    }

    let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
    println!("{}", json);

    Ok(())
}
