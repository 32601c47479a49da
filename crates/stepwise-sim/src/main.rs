use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    resolve::{self, ResolveArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod demo;

#[derive(Parser, Debug)]
#[command(name = "stepwise-sim", about = "Discrete-time simulation runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the greenhouse model under a YAML run configuration.
    Run(RunArgs),
    /// Print the parameter configurations a run would execute.
    Resolve(ResolveArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Resolve(args) => resolve::run(&args),
    }
}
