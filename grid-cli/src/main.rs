//! Grid CLI
//!
//! Command-line interface for interacting with the Grid hub.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "grid")]
#[command(about = "Grid compute mesh CLI", long_about = None)]
struct Cli {
    /// Hub URL
    #[arg(long, env = "GRID_HUB_URL", default_value = "http://localhost:8080")]
    hub_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        hub_url: cli.hub_url,
    };

    handle_command(cli.command, &config).await
}
