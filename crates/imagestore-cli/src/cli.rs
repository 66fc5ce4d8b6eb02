//! CLI for the imagestore boot image cache.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imagestore_core::config;
use imagestore_core::store::Store;
use std::path::PathBuf;

use commands::{run_path, run_populate, run_status, run_versions};

/// Top-level CLI for the image store.
#[derive(Debug, Parser)]
#[command(name = "imagestore")]
#[command(about = "Local cache of versioned boot images", long_about = None)]
pub struct Cli {
    /// Override the data directory (takes precedence over DATA_DIR and config.toml).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every catalog version that is not yet on disk.
    Populate {
        /// Print the outcome of every version, not only the first failure.
        #[arg(long)]
        report: bool,
    },

    /// Show each version, its local path and whether it is present.
    Status,

    /// Print the local image path for a version.
    Path {
        /// Version identifier (e.g. 4.8).
        version: String,
    },

    /// List catalog versions and their asset URLs.
    Versions,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(dir) = cli.data_dir {
            cfg.data_dir = dir;
        }
        tracing::debug!("loaded config: {:?}", cfg);
        let store = Store::from_config(&cfg)?;

        match cli.command {
            CliCommand::Populate { report } => run_populate(&store, report).await?,
            CliCommand::Status => run_status(&store)?,
            CliCommand::Path { version } => run_path(&store, &version)?,
            CliCommand::Versions => run_versions(&store),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
