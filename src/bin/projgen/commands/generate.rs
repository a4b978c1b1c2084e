//! `projgen generate` command

use anyhow::Result;

use projgen::util::progress::{BarProgress, Progress, SilentProgress};

use crate::cli::{Cli, GenerateArgs};
use crate::commands::load_configuration;

pub fn execute(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let config = load_configuration(cli, &args.target)?;

    let mut progress: Box<dyn Progress> = if cli.quiet {
        Box::new(SilentProgress::new())
    } else {
        Box::new(BarProgress::new())
    };

    let report = projgen::generate(&config, progress.as_mut())?;

    if !cli.quiet {
        println!(
            "Generated {} variants ({} files written)",
            report.variants,
            report.written.len()
        );
    }
    for path in &report.failed {
        eprintln!("warning: could not write {}", path.display());
    }

    Ok(())
}
