//! Command line utilities.

use std::path::PathBuf;

use anyhow::{Context, Result};
pub use clap::Parser;
use clap::{Args, Subcommand};

use crate::{
    build::BuildReport,
    config::{BuildMode, Config},
};

/// Command line usage description.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Command line options.
    #[command(flatten)]
    pub opts: Opts,
}

/// List of commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the site
    Build,

    /// Check the inline CSS budget of every page without writing anything
    Check,
}

/// Command line options.
#[derive(Debug, Default, Args, Clone)]
pub struct Opts {
    /// Configuration file [default: "ampsite.toml"]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Input directory [default: "."]
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Output directory [default: "_site"]
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Build mode [default: production]
    #[arg(long, global = true, value_enum)]
    pub mode: Option<BuildMode>,

    /// Maximum size of the inline stylesheet, in bytes [default: 76800]
    #[arg(long, global = true)]
    pub max_css_bytes: Option<usize>,

    /// SCSS entry compiled into `<style amp-custom>`
    #[arg(long, global = true)]
    pub stylesheet: Option<PathBuf>,
}

/// Run the `build` command.
pub fn build(opts: &Opts) -> Result<BuildReport> {
    let config = Config::from_opts(opts).context("loading configuration")?;

    tracing::info!("Building in {:?} mode...", config.mode);

    let report = crate::build(&config)?;

    tracing::info!(
        "Wrote {} pages and {} files in {:.2} seconds",
        report.pages,
        report.files,
        report.duration.as_secs_f64()
    );

    Ok(report)
}

/// Run the `check` command.
pub fn check(opts: &Opts) -> Result<BuildReport> {
    let config = Config::from_opts(opts).context("loading configuration")?;

    tracing::info!("Checking...");

    let report = crate::check(&config)?;

    tracing::info!(
        "Checked {} pages in {:.2} seconds",
        report.pages,
        report.duration.as_secs_f64()
    );

    Ok(report)
}
