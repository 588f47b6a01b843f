//! Jira REST integration: sprint list, sprint report and issue details.

pub mod client;
pub mod error;
pub mod model;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use url::Url;

pub use client::JiraClient;
pub use error::JiraError;
pub use model::{
    BasicSprint, Component, IssueDetails, ReportIssue, SprintDetails, SprintList, SprintReport,
    SprintReportContents,
};

/// Browse path appended to the Jira endpoint to build human-facing issue links.
pub const BROWSE_PATH: &str = "/browse/";

/// Source of full issue details, looked up by issue key.
///
/// This is the only remote call the report classifier makes.
pub trait IssueDetailsSource: Send + Sync {
    /// Fetches details for the issue with the given key.
    fn issue_details<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<IssueDetails>> + Send + 'a>>;
}

/// Appends path segments to `base`, collapsing duplicate slashes.
///
/// Any path already present on `base` is kept, so an endpoint such as
/// `https://example.com/jira` yields `https://example.com/jira/browse/KEY`.
pub fn join_url_path(base: &Url, segments: &[&str]) -> Url {
    let mut path = base.path().trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(segment);
    }

    let mut url = base.clone();
    url.set_path(&path);
    url
}

/// Returns the browse URL for an issue.
pub fn browse_url(endpoint: &Url, key: &str) -> Url {
    join_url_path(endpoint, &[BROWSE_PATH, key])
}
