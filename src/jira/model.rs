//! Wire models for the Jira greenhopper and issue endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sprint as returned by the sprint query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSprint {
    /// Numeric sprint id.
    pub id: i64,
    /// Ordering hint assigned by Jira.
    #[serde(default)]
    pub sequence: i64,
    /// Display name, e.g. `IMR Sprint 2021-W05-06`.
    pub name: String,
    /// `ACTIVE`, `CLOSED` or `FUTURE`.
    #[serde(default)]
    pub state: String,
    /// Sprint goal text.
    #[serde(default)]
    pub goal: Option<String>,
}

impl BasicSprint {
    /// Whether the sprint has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("CLOSED")
    }
}

/// Response of the sprint query endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintList {
    /// Sprints on the board, oldest first.
    #[serde(default)]
    pub sprints: Vec<BasicSprint>,
    /// Board the sprints belong to.
    #[serde(default)]
    pub rapid_view_id: i64,
}

/// Value part of an estimate statistic. Jira sends `{}` for unestimated issues.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatFieldValue {
    /// Numeric value, if any.
    #[serde(default)]
    pub value: Option<f64>,
    /// Display text, if any.
    #[serde(default)]
    pub text: Option<String>,
}

/// Estimate statistic attached to a report issue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    /// Field the statistic is computed from.
    #[serde(default)]
    pub stat_field_id: String,
    /// Statistic value.
    #[serde(default)]
    pub stat_field_value: StatFieldValue,
}

impl Statistic {
    /// Returns the value truncated toward zero, 0 when absent.
    pub fn as_points(&self) -> i64 {
        self.stat_field_value.value.map_or(0, |v| v as i64)
    }
}

/// Issue entry inside a sprint report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIssue {
    /// Numeric issue id.
    #[serde(default)]
    pub id: i64,
    /// Issue key, e.g. `PROJ-1`.
    pub key: String,
    /// Issue title.
    #[serde(default)]
    pub summary: String,
    /// Whether the issue is in a done status.
    #[serde(default)]
    pub done: bool,
    /// Issue type name.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Status name.
    #[serde(default)]
    pub status_name: Option<String>,
    /// Estimate when the sprint started.
    #[serde(default)]
    pub estimate_statistic: Statistic,
    /// Estimate at report time.
    #[serde(default)]
    pub current_estimate_statistic: Statistic,
}

impl ReportIssue {
    /// Original estimate in whole points.
    pub fn original_estimate(&self) -> i64 {
        self.estimate_statistic.as_points()
    }

    /// Current estimate in whole points.
    pub fn current_estimate(&self) -> i64 {
        self.current_estimate_statistic.as_points()
    }
}

#[cfg(test)]
impl Statistic {
    pub(crate) fn points(value: f64) -> Self {
        Self {
            stat_field_id: String::new(),
            stat_field_value: StatFieldValue {
                value: Some(value),
                text: None,
            },
        }
    }
}

#[cfg(test)]
impl ReportIssue {
    /// Report issue with the same original and current estimate.
    pub(crate) fn new(key: impl Into<String>, summary: impl Into<String>, points: f64) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            estimate_statistic: Statistic::points(points),
            current_estimate_statistic: Statistic::points(points),
            ..Self::default()
        }
    }

    #[must_use]
    pub(crate) fn with_current_estimate(mut self, points: f64) -> Self {
        self.current_estimate_statistic = Statistic::points(points);
        self
    }
}

/// Issue buckets of a sprint report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintReportContents {
    /// Issues completed in the sprint.
    #[serde(default)]
    pub completed_issues: Vec<ReportIssue>,
    /// Issues still open at sprint close.
    #[serde(default)]
    pub issues_not_completed_in_current_sprint: Vec<ReportIssue>,
    /// Issues removed from the sprint.
    #[serde(default)]
    pub punted_issues: Vec<ReportIssue>,
    /// Issues completed outside the sprint. Not reported.
    #[serde(default)]
    pub issues_completed_in_another_sprint: Vec<ReportIssue>,
    /// Keys of issues added after the sprint started.
    #[serde(default)]
    pub issue_keys_added_during_sprint: HashMap<String, bool>,
}

impl SprintReportContents {
    /// Whether `key` was added after the sprint started.
    pub fn was_added_during_sprint(&self, key: &str) -> bool {
        self.issue_keys_added_during_sprint.contains_key(key)
    }
}

/// Sprint metadata attached to a report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintDetails {
    /// Numeric sprint id.
    #[serde(default)]
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Sprint state.
    #[serde(default)]
    pub state: String,
    /// ISO start date.
    #[serde(default)]
    pub iso_start_date: Option<String>,
    /// ISO end date.
    #[serde(default)]
    pub iso_end_date: Option<String>,
    /// ISO completion date.
    #[serde(default)]
    pub iso_complete_date: Option<String>,
}

/// Sprint report returned by the greenhopper charts endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintReport {
    /// Issue buckets.
    #[serde(default)]
    pub contents: SprintReportContents,
    /// Sprint the report describes.
    #[serde(default)]
    pub sprint: SprintDetails,
}

/// Component attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Component description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Issue fields as returned by `/rest/api/latest/issue/{key}`.
///
/// Custom fields are kept in `extra` since their ids vary per Jira instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Raw issue details response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueResponse {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl IssueResponse {
    /// Converts the wire response into [`IssueDetails`], reading the
    /// discipline from the given custom field.
    ///
    /// Select-list custom fields arrive as `{"id": ..., "value": ...}`; a plain
    /// string is accepted too.
    pub(crate) fn into_details(self, discipline_field: &str) -> IssueDetails {
        let discipline = match self.fields.extra.get(discipline_field) {
            Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_str),
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
        .filter(|s| !s.is_empty())
        .map(String::from);

        IssueDetails {
            key: self.key,
            summary: self.fields.summary,
            components: self.fields.components,
            discipline,
        }
    }
}

/// Issue details used for discipline resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDetails {
    /// Issue key.
    pub key: String,
    /// Issue title.
    pub summary: String,
    /// Components in the order Jira lists them.
    pub components: Vec<Component>,
    /// Value of the discipline custom field, `None` when unset or empty.
    pub discipline: Option<String>,
}
