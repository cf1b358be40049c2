//! z80conf CLI - capability prober for the Z80 emulator library

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use z80conf::ops::ConfigureError;
use z80conf::util::Shell;

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("z80conf=debug")
    } else if cli.quiet {
        EnvFilter::new("z80conf=warn")
    } else {
        EnvFilter::new("z80conf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);
    let verbose = cli.verbose;

    match run(cli, &shell) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            if let Some(err) = e.downcast_ref::<ConfigureError>() {
                if verbose && err.is_missing_prerequisite() {
                    for line in err.trial_diagnostic().unwrap_or_default().lines() {
                        eprintln!("  | {}", line);
                    }
                    if let Some(help) = err.help() {
                        eprintln!("  help: {}", help);
                    }
                }
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<i32> {
    // Execute command
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args, shell).map(|()| 0),
        Commands::Probe(args) => {
            commands::probe::execute(args, shell).map(|found| if found { 0 } else { 1 })
        }
        Commands::List => commands::list::execute().map(|()| 0),
        Commands::Completions(args) => commands::completions::execute(args).map(|()| 0),
    }
}
