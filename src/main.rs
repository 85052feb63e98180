mod astronaut;
mod cli;
mod config;
mod error;
mod output;
mod pipeline;
mod snapshot;
mod sources;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting whosinspace");
    cli.execute().await?;

    Ok(())
}
