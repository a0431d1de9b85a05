//! tablecast - publishes directory tables as versioned JSON endpoints
//!
//! Fetches tables from the upstream API, transforms them per endpoint,
//! and uploads the results for public consumption.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "tablecast")]
#[command(about = "Publishes directory tables as versioned JSON endpoints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run one publish cycle across every registered endpoint
    Publish(cmd::publish::PublishArgs),
    /// Download one raw table and print it as JSON
    Fetch(cmd::fetch::FetchArgs),
    /// Print every endpoint's public download URL
    Endpoints,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tablecast_core::init_logging(false, cli.debug);

    match cli.command {
        Command::Publish(args) => cmd::publish::run(args),
        Command::Fetch(args) => cmd::fetch::run(args),
        Command::Endpoints => cmd::endpoints::run(),
    }
}
