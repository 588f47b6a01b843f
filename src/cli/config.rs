//! Configuration-related CLI commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::utils::Settings;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the resolved configuration with secrets masked.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        let path = Settings::get_settings_path()?;
        let settings = Settings::load().context("Failed to load settings")?;
        let config = AppConfig::from_settings(&settings)?;

        println!("# settings file: {}", path.display());
        print!("{}", render(&config)?);
        Ok(())
    }
}

fn render(config: &AppConfig) -> Result<String> {
    serde_yaml::to_string(config).context("Failed to serialize configuration")
}
