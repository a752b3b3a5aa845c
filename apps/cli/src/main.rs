//! plotsift CLI — filter the IMDb title dump and list plots from OMDb.
//!
//! Scans `title.basics.tsv`, keeps the titles matching the given column
//! filters, fetches each survivor's plot and prints a fixed-width listing.

mod commands;
mod presenter;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
