//! Sprint name helpers.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::jira::BasicSprint;

/// `<TEAM> Sprint <YYYY>[-]W?<NN>[-]W?<NN>`, e.g. `IMR Sprint 2021-W05-06`.
static SPRINT_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2,4}\s+Sprint\s+(\d{4})-?W?(\d{2})-?W?(\d{2})").unwrap()
});

/// Rewrites a sprint name to `YYYY-WNN-NN`.
///
/// Names that do not follow the team sprint pattern are returned unchanged.
pub fn simplify_sprint_name(name: &str) -> String {
    match SPRINT_NAME_PATTERN.captures(name) {
        Some(caps) => format!("{}-W{}-{}", &caps[1], &caps[2], &caps[3]),
        None => name.to_string(),
    }
}

/// Builds the pattern matching team sprints of a given year.
pub fn sprint_year_pattern(year: &str) -> Result<Regex> {
    let pattern = format!(
        r"[A-Z]{{2,4}}\s+Sprint\s+({})[-\s]?W?(\d{{2}})-W?(\d{{2}})",
        regex::escape(year.trim())
    );
    Regex::new(&pattern).with_context(|| format!("Invalid sprint pattern for year '{year}'"))
}

/// Keeps closed sprints whose name belongs to `year`, preserving order.
pub fn filter_sprints_by_year(sprints: &[BasicSprint], year: &str) -> Result<Vec<BasicSprint>> {
    let pattern = sprint_year_pattern(year)?;
    Ok(sprints
        .iter()
        .filter(|s| s.is_closed() && pattern.is_match(&s.name))
        .cloned()
        .collect())
}
