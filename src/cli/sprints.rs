//! `sprints` command: lists closed sprints of a year.

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::JiraConfig;
use crate::jira::JiraClient;
use crate::report::{filter_sprints_by_year, simplify_sprint_name};
use crate::utils::Settings;

/// Sprints command options.
#[derive(Parser)]
pub struct SprintsCommand {
    /// Board (rapid view) id of the Jira project.
    #[arg(short, long)]
    pub project: String,

    /// Year whose closed sprints are listed (defaults to the current year).
    #[arg(short, long)]
    pub year: Option<String>,
}

impl SprintsCommand {
    /// Executes the sprints command.
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load().context("Failed to load settings")?;
        let config = JiraConfig::from_settings(&settings).context("Incomplete Jira configuration")?;
        let year = self.year.unwrap_or_else(crate::cli::current_year);

        let jira = JiraClient::new(&config).context("Failed to create Jira client")?;
        let list = jira
            .list_sprints(&self.project, false)
            .await
            .context("Failed to get sprint list")?;

        let sprints = filter_sprints_by_year(&list.sprints, &year)?;
        if sprints.is_empty() {
            println!("No closed sprints found for {year}");
            return Ok(());
        }

        for sprint in &sprints {
            println!(
                "{:>8}  {:<40}  {}",
                sprint.id,
                sprint.name,
                simplify_sprint_name(&sprint.name)
            );
        }
        Ok(())
    }
}
