//! `sync` command: writes sprint reports to the spreadsheet.

use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use crate::cli::prompt::select_sprint;
use crate::config::AppConfig;
use crate::jira::{BasicSprint, JiraClient};
use crate::sheets::{DryRunWriter, GoogleSheetsClient, SheetWriter, SpreadsheetWriter};
use crate::sync::SprintSync;

/// Sync command options.
#[derive(Parser)]
pub struct SyncCommand {
    /// Board (rapid view) id of the Jira project.
    #[arg(short, long)]
    pub project: String,

    /// Year whose closed sprints are considered (defaults to the current year).
    #[arg(short, long)]
    pub year: Option<String>,

    /// Syncs every closed sprint of the year without prompting.
    #[arg(short, long, conflicts_with = "sprint")]
    pub all: bool,

    /// Syncs the closed sprint with exactly this name.
    #[arg(short, long)]
    pub sprint: Option<String>,

    /// Prints rows as YAML instead of writing to Google Sheets.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Executes the sync command.
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load()?;
        let year = self.year.clone().unwrap_or_else(crate::cli::current_year);

        let writer: Box<dyn SheetWriter> = if self.dry_run {
            Box::new(DryRunWriter::stdout())
        } else {
            let token = config.sheets.require_access_token()?;
            let client = GoogleSheetsClient::new(token, config.jira.timeout)
                .context("Failed to create Google Sheets client")?;
            Box::new(SpreadsheetWriter::new(
                client,
                config.sheets.spreadsheet_id.clone(),
            ))
        };

        let jira = JiraClient::new(&config.jira).context("Failed to create Jira client")?;
        let mut sync = SprintSync::new(jira, writer, config.sheets.clone(), self.project.clone());

        let sprints = sync.closed_sprints(&year).await?;
        if sprints.is_empty() {
            bail!("No closed sprints found for {year} on board {}", self.project);
        }
        debug!(year = %year, count = sprints.len(), "Closed sprints found");

        let selected = self.select(&sprints)?;
        if selected.is_empty() {
            self.progress("No sprint selected, nothing to do");
            return Ok(());
        }

        for sprint in selected {
            self.progress(&format!("⏳ Syncing {}", sprint.name));
            let summary = sync.sync_sprint(sprint).await?;
            self.progress(&format!(
                "✅ {} ({}): {} ticket rows",
                summary.sprint_name, summary.sprint_label, summary.ticket_rows
            ));
        }

        if !self.dry_run {
            sync.reset_formats().await?;
        }
        debug!(fetches = sync.discipline_fetches(), "Discipline lookups");

        self.progress("ALL DONE!");
        Ok(())
    }

    fn select<'a>(&self, sprints: &'a [BasicSprint]) -> Result<Vec<&'a BasicSprint>> {
        if self.all {
            return Ok(sprints.iter().collect());
        }

        if let Some(name) = &self.sprint {
            return match sprints.iter().find(|s| &s.name == name) {
                Some(sprint) => Ok(vec![sprint]),
                None => bail!("Sprint '{name}' is not a closed sprint of this year"),
            };
        }

        let chosen = select_sprint(
            sprints,
            io::stdin().is_terminal(),
            &mut io::BufReader::new(io::stdin()),
        )?;
        Ok(chosen.into_iter().collect())
    }

    /// Dry runs keep stdout for YAML, so progress goes to stderr.
    fn progress(&self, message: &str) {
        if self.dry_run {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}
