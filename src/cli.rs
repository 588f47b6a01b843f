//! CLI interface for jira-metrics.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod prompt;
pub mod sprints;
pub mod sync;

/// jira-metrics: sprint metrics from Jira into Google Sheets.
#[derive(Parser)]
#[command(name = "jira-metrics")]
#[command(about = "Syncs Jira sprint reports into a Google Spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Syncs sprints from Jira to the spreadsheet.
    Sync(sync::SyncCommand),
    /// Lists the closed sprints of a year.
    Sprints(sprints::SprintsCommand),
    /// Configuration inspection.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sync(sync_cmd) => sync_cmd.execute().await,
            Commands::Sprints(sprints_cmd) => sprints_cmd.execute().await,
            Commands::Config(config_cmd) => config_cmd.execute(),
        }
    }
}

/// Returns the current calendar year as a string.
pub(crate) fn current_year() -> String {
    use chrono::Datelike;

    chrono::Local::now().year().to_string()
}
