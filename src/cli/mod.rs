//! CLI module for Announcements Sync
//!
//! Provides subcommands driving the library services:
//! - `features`: synchronize announcements for the configured app version
//! - `variation`: resolve an experiment variation through the sticky cache
//! - `reset-assignments`: drop every pinned variation
//! - `clear-cache`: drop the cached announcements

pub mod features;
pub mod maintenance;
pub mod variation;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Announcements Sync - cached feature announcements and sticky A/B variations
#[derive(Debug, Parser)]
#[command(name = "announcements-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synchronize announcements and print them as JSON
    Features,

    /// Resolve a variation for an experiment
    Variation(variation::VariationArgs),

    /// Remove every pinned variation (identity reset)
    ResetAssignments,

    /// Remove cached announcements
    ClearCache,
}

/// Loads configuration, wires services and dispatches the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load_with(cli.config.as_deref())
        .context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let services = crate::create_services(&config).await?;

    match cli.command {
        Command::Features => features::run(&services).await,
        Command::Variation(args) => variation::run(&services, &args).await,
        Command::ResetAssignments => maintenance::reset_assignments(&services).await,
        Command::ClearCache => maintenance::clear_cache(&services).await,
    }
}
