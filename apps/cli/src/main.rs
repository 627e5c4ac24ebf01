//! Lexigen CLI: themed Spanish vocabulary lists from a text-generation model.
//!
//! Generates validated vocabulary dictionaries from the command line or
//! serves the same pipeline over HTTP.

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
