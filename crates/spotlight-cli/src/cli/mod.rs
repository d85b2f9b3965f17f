//! CLI for the spotlight image extractor.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spotlight_core::config::{self, SpotlightConfig};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_fetch, run_probe, run_status};

/// Top-level CLI for the spotlight image extractor.
#[derive(Debug, Parser)]
#[command(name = "spotlight")]
#[command(about = "Collect spotlight lock-screen images, skipping content already on disk", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch images until no task is left; each new image schedules one more task.
    Run {
        /// Worker threads and initial tasks (default from config).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Output directory (default from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show how many distinct images the output directory holds.
    Status {
        /// Output directory (default from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Ask the discovery endpoint which image it offers for a market; nothing is downloaded.
    Probe {
        /// Market/country code, e.g. "de".
        country: String,
    },

    /// Compute SHA-256 of a file (the digest the store indexes by).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { workers, output } => {
                let cfg = with_overrides(cfg, workers, output)?;
                run_fetch(&cfg)?;
            }
            CliCommand::Status { output } => {
                let cfg = with_overrides(cfg, None, output)?;
                run_status(&cfg)?;
            }
            CliCommand::Probe { country } => run_probe(&cfg, &country)?,
            CliCommand::Checksum { path } => run_checksum(Path::new(&path))?,
        }

        Ok(())
    }
}

/// Apply command-line overrides on top of the loaded config.
fn with_overrides(
    mut cfg: SpotlightConfig,
    workers: Option<usize>,
    output: Option<PathBuf>,
) -> Result<SpotlightConfig> {
    if let Some(n) = workers {
        cfg.workers = n;
    }
    if let Some(dir) = output {
        cfg.output_dir = dir;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests;
