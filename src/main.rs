mod analysis;
mod auth;
mod cli;
mod compose;
mod config;
mod enricher;
mod error;
mod event;
mod model;
mod output;
mod providers;
mod sinks;
mod status;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting cinotify");
    cli.execute().await?;

    Ok(())
}
