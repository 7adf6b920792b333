//! ContentFactory CLI — batch article generation from a topic table.
//!
//! Reads a CSV of topics and outlines, generates a definition and an article
//! per topic, and packages the resulting documents with a summary table.

mod commands;

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
