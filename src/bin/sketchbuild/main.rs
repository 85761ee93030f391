//! sketchbuild CLI - compile sketches and export their firmware

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sketchbuild::ops::CompileError;
use sketchbuild::util::diagnostic;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("sketchbuild=debug")
    } else {
        EnvFilter::new("sketchbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<CompileError>() {
            Some(compile_error) => diagnostic::emit(&compile_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compile(args) => commands::compile::execute(args, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
