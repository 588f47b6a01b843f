//! Sprint sync pipeline: Jira sprint report → classified rows → spreadsheet.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::config::SheetsConfig;
use crate::jira::{BasicSprint, JiraClient};
use crate::report::row::to_value_grid;
use crate::report::{
    filter_sprints_by_year, simplify_sprint_name, DisciplineResolver, ReportClassifier,
};
use crate::sheets::SheetWriter;

/// Outcome of syncing one sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Sprint name as shown in Jira.
    pub sprint_name: String,
    /// Normalized sprint label.
    pub sprint_label: String,
    /// Ticket rows produced by the classifier.
    pub ticket_rows: usize,
}

/// Syncs sprints of one board into the configured spreadsheet.
///
/// One instance should be used for a whole run so the discipline cache is
/// shared across sprints.
pub struct SprintSync {
    jira: JiraClient,
    classifier: ReportClassifier,
    writer: Box<dyn SheetWriter>,
    sheets: SheetsConfig,
    rapid_view_id: String,
}

impl SprintSync {
    /// Creates a sync for the board `rapid_view_id`.
    pub fn new(
        jira: JiraClient,
        writer: Box<dyn SheetWriter>,
        sheets: SheetsConfig,
        rapid_view_id: impl Into<String>,
    ) -> Self {
        let resolver = DisciplineResolver::new(Box::new(jira.clone()));
        let classifier = ReportClassifier::new(jira.endpoint().clone(), resolver);
        Self {
            jira,
            classifier,
            writer,
            sheets,
            rapid_view_id: rapid_view_id.into(),
        }
    }

    /// Lists the board's closed sprints belonging to `year`.
    pub async fn closed_sprints(&self, year: &str) -> Result<Vec<BasicSprint>> {
        let list = self
            .jira
            .list_sprints(&self.rapid_view_id, false)
            .await
            .context("Failed to get sprint list")?;
        filter_sprints_by_year(&list.sprints, year)
    }

    /// Fetches, classifies and writes one sprint, then records it in the
    /// sprint list.
    pub async fn sync_sprint(&mut self, sprint: &BasicSprint) -> Result<SyncSummary> {
        let sprint_id = sprint.id.to_string();
        let report = self
            .jira
            .sprint_report(&self.rapid_view_id, &sprint_id)
            .await
            .with_context(|| format!("Failed to get sprint report for '{}'", sprint.name))?;

        let rows = self.classifier.classify(&report).await;
        info!(sprint = %sprint.name, rows = rows.len(), "Writing ticket rows");

        self.writer
            .append_rows(&self.sheets.tickets_range, &to_value_grid(&rows))
            .await
            .context("Failed to write issues to the spreadsheet")?;

        let sprint_label = simplify_sprint_name(&sprint.name);
        let sprint_row = vec![vec![
            Value::from(sprint.name.as_str()),
            Value::from(sprint_id),
            Value::from(sprint_label.as_str()),
        ]];
        self.writer
            .append_rows(&self.sheets.sprints_range, &sprint_row)
            .await
            .with_context(|| format!("Failed to add sprint '{}' to the sprint list", sprint.name))?;

        Ok(SyncSummary {
            sprint_name: sprint.name.clone(),
            sprint_label,
            ticket_rows: rows.len(),
        })
    }

    /// Resets formatting of the tickets and sprint list tabs.
    pub async fn reset_formats(&self) -> Result<()> {
        self.writer
            .reset_format(self.sheets.tickets_gid)
            .await
            .context("Failed to reset issues format")?;
        self.writer
            .reset_format(self.sheets.sprints_gid)
            .await
            .context("Failed to reset sprint list format")
    }

    /// Remote discipline lookups made so far in this run.
    pub fn discipline_fetches(&self) -> usize {
        self.classifier.resolver().remote_fetches()
    }
}
