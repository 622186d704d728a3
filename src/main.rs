mod cli;
mod config;
mod engine;
mod error;
mod locale;
mod parse;
mod preview;
mod report;
mod source;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview(args) => preview::run(args)?,
        Commands::Detect(args) => locale::run(args)?,
        Commands::Parse(args) => parse::run(args)?,
        Commands::Config(args) => config::commands::run(args)?,
    }

    Ok(())
}
