//! AozoraKit CLI: web-novel archives to Aozora Bunko formatted text.
//!
//! Converts a downloaded novel directory (`toc.json` plus per-episode JSON)
//! into a single `.aozora.txt` ready for vertical-text readers.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
