mod auth;
mod cli;
mod config;
mod error;
mod output;
mod providers;
mod usage;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting cfpaths - CloudFormation template usage report");
    cli.execute().await?;

    Ok(())
}
