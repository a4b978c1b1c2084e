//! projgen CLI - generate CMake descriptors for a convention-laid-out tree

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
        EnvFilter::new("projgen=debug")
    } else if cli.quiet {
        EnvFilter::new("projgen=warn")
    } else {
        EnvFilter::new("projgen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Generate(ref args) => commands::generate::execute(&cli, args),
        Commands::Plan(ref args) => commands::plan::execute(&cli, args),
        Commands::Completions(ref args) => commands::completions::execute(args),
    }
}
