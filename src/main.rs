use anyhow::Result;
use clap::{Parser, Subcommand};

use mediagate::commands::{check, serve};

/// Range-aware media gateway.
#[derive(Debug, Parser)]
#[command(name = "mediagate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve objects from the configured store
    Serve(serve::ServeArgs),
    /// Validate the configuration file
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve::execute(args).await,
        Command::Check(args) => check::execute(&args),
    }
}
