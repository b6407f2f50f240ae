//! RepliDocs CLI — fetch fresh documentation into your IDE's AI context.
//!
//! Searches the web for a programming question, lets a language model pick
//! and vet the best page, and writes its tail to a single text file.

mod commands;
mod shell;

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
