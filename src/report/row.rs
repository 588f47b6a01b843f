//! Spreadsheet row schema.

use serde::Serialize;
use serde_json::Value;

/// One ticket row in the metrics spreadsheet.
///
/// Field order matches the column order of the tickets tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    /// Normalized sprint label.
    #[serde(rename = "Sprint")]
    pub sprint: String,
    /// Engineering discipline.
    #[serde(rename = "Dicipline")]
    pub discipline: String,
    /// Issue key.
    #[serde(rename = "Ticket Number")]
    pub ticket_number: String,
    /// Issue title.
    #[serde(rename = "Title")]
    pub title: String,
    /// `=HYPERLINK(...)` formula pointing at the issue.
    #[serde(rename = "Link")]
    pub link: String,
    /// Original estimate of issues planned at sprint start.
    #[serde(rename = "Commited")]
    pub commited: i64,
    /// Original estimate of issues removed from the sprint.
    #[serde(rename = "Dropped")]
    pub dropped: i64,
    /// Original estimate of issues added after sprint start.
    #[serde(rename = "Added")]
    pub added: i64,
    /// `commited - dropped + added`.
    #[serde(rename = "Adjusted")]
    pub adjusted: i64,
    /// Current estimate of issues left open.
    #[serde(rename = "Carried Over")]
    pub carried_over: i64,
    /// Original estimate of completed issues.
    #[serde(rename = "Completed")]
    pub completed: i64,
}

impl SheetRow {
    /// Column headers, in row order.
    pub const HEADERS: [&'static str; 11] = [
        "Sprint",
        "Dicipline",
        "Ticket Number",
        "Title",
        "Link",
        "Commited",
        "Dropped",
        "Added",
        "Adjusted",
        "Carried Over",
        "Completed",
    ];

    /// Net estimate after additions and removals.
    pub fn compute_adjusted(&self) -> i64 {
        self.commited - self.dropped + self.added
    }

    /// Converts the row into cell values for a Sheets append.
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.sprint.as_str()),
            Value::from(self.discipline.as_str()),
            Value::from(self.ticket_number.as_str()),
            Value::from(self.title.as_str()),
            Value::from(self.link.as_str()),
            Value::from(self.commited),
            Value::from(self.dropped),
            Value::from(self.added),
            Value::from(self.adjusted),
            Value::from(self.carried_over),
            Value::from(self.completed),
        ]
    }
}

/// Converts rows into the value grid expected by the Sheets API.
pub fn to_value_grid(rows: &[SheetRow]) -> Vec<Vec<Value>> {
    rows.iter().map(SheetRow::to_values).collect()
}
