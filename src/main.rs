//! Build transform chain for AMP sites.

use std::io::IsTerminal;

use ampsite::cli::{Cli, Command, Parser};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build => ampsite::cli::build(&cli.opts)?,
        Command::Check => ampsite::cli::check(&cli.opts)?,
    };

    Ok(())
}
