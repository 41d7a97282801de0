use anyhow::Result;
use clap::Parser;

mod cli;
mod error;
mod group;
mod options;
mod pipeline;
mod prereqs;
mod table;
mod workflow;
mod workspace;

use cli::RootArgs;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = RootArgs::parse();
    workflow::run(&args)
}
