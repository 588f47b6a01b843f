//! Jira REST client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::error::{ErrorResponse, JiraError};
use super::model::{IssueDetails, IssueResponse, SprintList, SprintReport};
use super::{join_url_path, IssueDetailsSource};
use crate::config::JiraConfig;

/// Path of the issue details endpoint.
pub const ISSUE_DETAILS_PATH: &str = "/rest/api/latest/issue/";

/// Path of the sprint query endpoint.
pub const SPRINT_LIST_PATH: &str = "/rest/greenhopper/1.0/sprintquery/";

/// Path of the (undocumented) sprint report endpoint.
pub const SPRINT_REPORT_PATH: &str = "/rest/greenhopper/1.0/rapid/charts/sprintreport";

/// Jira API client.
///
/// Cloning is cheap: the underlying HTTP connection pool is shared.
#[derive(Clone)]
pub struct JiraClient {
    /// HTTP client for API requests.
    client: Client,
    /// Base URL of the Jira instance.
    endpoint: Url,
    /// Basic auth user.
    username: String,
    /// Basic auth password (API token).
    token: String,
    /// Custom field carrying the discipline.
    discipline_field: String,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .field("discipline_field", &self.discipline_field)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Creates a new Jira client from configuration.
    pub fn new(config: &JiraConfig) -> Result<Self, JiraError> {
        if config.username.trim().is_empty() || config.token.trim().is_empty() {
            return Err(JiraError::MissingCredentials);
        }

        let endpoint =
            Url::parse(config.endpoint_prefix.trim()).map_err(|e| JiraError::InvalidEndpoint {
                endpoint: config.endpoint_prefix.clone(),
                reason: e.to_string(),
            })?;
        if endpoint.cannot_be_a_base() {
            return Err(JiraError::InvalidEndpoint {
                endpoint: config.endpoint_prefix.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JiraError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            username: config.username.clone(),
            token: config.token.clone(),
            discipline_field: config.discipline_field.clone(),
        })
    }

    /// Base URL of the Jira instance.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Lists the sprints of a board.
    pub async fn list_sprints(
        &self,
        rapid_view_id: &str,
        include_future_sprints: bool,
    ) -> Result<SprintList, JiraError> {
        let mut url = join_url_path(&self.endpoint, &[SPRINT_LIST_PATH, rapid_view_id]);
        url.query_pairs_mut().append_pair(
            "includeFutureSprints",
            if include_future_sprints {
                "true"
            } else {
                "false"
            },
        );

        let list: SprintList = self.get_json(url).await?;
        debug!(
            rapid_view_id,
            sprint_count = list.sprints.len(),
            "Fetched sprint list"
        );
        Ok(list)
    }

    /// Fetches the sprint report for a sprint on a board.
    pub async fn sprint_report(
        &self,
        rapid_view_id: &str,
        sprint_id: &str,
    ) -> Result<SprintReport, JiraError> {
        let mut url = join_url_path(&self.endpoint, &[SPRINT_REPORT_PATH]);
        url.query_pairs_mut()
            .append_pair("rapidViewId", rapid_view_id)
            .append_pair("sprintId", sprint_id);

        let report: SprintReport = self.get_json(url).await?;
        debug!(
            sprint = %report.sprint.name,
            completed = report.contents.completed_issues.len(),
            not_completed = report.contents.issues_not_completed_in_current_sprint.len(),
            removed = report.contents.punted_issues.len(),
            "Fetched sprint report"
        );
        Ok(report)
    }

    /// Fetches full details of an issue.
    pub async fn issue(&self, key: &str) -> Result<IssueDetails, JiraError> {
        let url = join_url_path(&self.endpoint, &[ISSUE_DETAILS_PATH, key]);
        let response: IssueResponse = self.get_json(url).await?;
        Ok(response.into_details(&self.discipline_field))
    }

    /// Sends an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, JiraError> {
        info!(url = %url, "Sending request to Jira API");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|e| JiraError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error response body: {e}");
                String::new()
            });
            return Err(JiraError::ApiRequestFailed {
                status: status.as_u16(),
                message: ErrorResponse::message_from_body(&error_text),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| JiraError::InvalidResponseFormat(e.to_string()))
    }
}

impl IssueDetailsSource for JiraClient {
    fn issue_details<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<IssueDetails>> + Send + 'a>> {
        Box::pin(async move { Ok(self.issue(key).await?) })
    }
}
