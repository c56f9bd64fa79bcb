//! # docs-bucket CLI
//!
//! Thin glue over [`docs_bucket_core::service`]: parse arguments, load the
//! YAML config, run one trigger and report its message. All pipeline logic
//! lives in `docs-bucket-core`.
//!
//! For programmatic and integration-test use, build a [`Cli`] and call [`run`].

use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use docs_bucket_core::service::{self, TriggerOutcome};
use std::path::PathBuf;

/// CLI for docs-bucket: export documents to a staging directory and refresh
/// knowledge collections from it.
#[derive(Parser)]
#[clap(
    name = "docs-bucket",
    version,
    about = "Export source documents to Markdown and sync them into knowledge collections"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export every source document into the staging directory
    Export {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Clear the knowledge collections and upload the staging directory
    Upload {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Runs one subcommand. Prints the trigger message and returns an error when
/// the trigger reports failure, so the binary exits non-zero.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("cli_started");

    let (command, outcome) = match cli.command {
        Commands::Export { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "export", "Starting export");
            ("export", service::run_export(&config).await)
        }
        Commands::Upload { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "upload", "Starting upload");
            ("upload", service::run_upload(&config).await)
        }
    };

    report(command, outcome)
}

fn report(command: &str, outcome: TriggerOutcome) -> Result<()> {
    println!("{}", outcome.message);
    if outcome.success {
        tracing::info!(command, message = %outcome.message, "Command complete");
        Ok(())
    } else {
        tracing::error!(command, message = %outcome.message, "Command failed");
        Err(anyhow::Error::msg(outcome.message))
    }
}
